//! Domain normalization and suffix matching.

/// Normalize a domain-ish string to a bare lower-case host.
///
/// Accepts plain hosts as well as URLs: the scheme, credentials, path,
/// query, fragment, port and a leading `www.` are removed. Garbage
/// normalizes to the empty string, which callers must treat as invalid.
///
/// The passes are repeated until nothing changes, so
/// `normalize_domain(&normalize_domain(x)) == normalize_domain(x)`.
///
/// Two steps are deliberately narrower than a plain "last separator" rule:
/// credentials end at the last `@` before the first `/`, `?` or `#` (so
/// `http://evil.com/@good.com` is `evil.com`), and a port is only removed
/// from a host with a single `:` or from a bracketed IPv6 literal (so
/// `host:1:80` is left as is).
pub fn normalize_domain(input: &str) -> String {
    let mut host = normalize_once(input);
    loop {
        let next = normalize_once(&host);
        if next == host {
            return host;
        }
        host = next;
    }
}

fn normalize_once(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut host = lowered.as_str();

    // Protocol-relative URL
    host = host.strip_prefix("//").unwrap_or(host);

    host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(host);

    // Credentials: last '@' inside the authority part
    let authority_end = host.find(['/', '?', '#']).unwrap_or(host.len());
    if let Some(at) = host[..authority_end].rfind('@') {
        host = &host[at + 1..];
    }

    // Path, query, fragment
    if let Some(end) = host.find(['/', '?', '#']) {
        host = &host[..end];
    }

    host = strip_port(host);
    host = host.strip_prefix("www.").unwrap_or(host);

    let host = host.trim().trim_end_matches('.');
    if host.chars().all(|c| matches!(c, '.' | ':')) {
        return String::new();
    }
    host.to_string()
}

/// Remove a trailing `:port`.
///
/// Bracketed IPv6 literals keep their brackets (`[::1]:8080` becomes
/// `[::1]`). A bare IPv6 address has several colons and is left alone.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find("]:") {
            Some(end) if is_port(&host[end + 2..]) => &host[..=end],
            _ => host,
        };
    }
    if host.contains('[') || host.matches(':').count() != 1 {
        return host;
    }

    match host.rfind(':') {
        Some(colon) if is_port(&host[colon + 1..]) => &host[..colon],
        _ => host,
    }
}

fn is_port(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Check if candidate is a strict subdomain of domain (not equal).
///
/// Both sides must already be normalized. The separating dot is part of
/// the comparison, so `myexample.com` is not a subdomain of `example.com`.
pub fn is_strict_subdomain(candidate: &str, domain: &str) -> bool {
    let suffix = format!(".{}", domain);
    candidate.ends_with(&suffix)
}

/// Check if candidate is a subdomain or equal to domain.
pub fn is_subdomain_or_equal(candidate: &str, domain: &str) -> bool {
    candidate == domain || is_strict_subdomain(candidate, domain)
}
