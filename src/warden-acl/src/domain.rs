//! Domain access control list.

use std::path::Path;

use tracing::{debug, trace, warn};

use super::{
    AclError, Result,
    decision::{Acl, ListMode, Permission},
    host::{is_subdomain_or_equal, normalize_domain},
    rules_file,
};

const BLACKLIST_HEADER: &str = "Domain Blacklist - Domains in this list will be denied access";
const WHITELIST_HEADER: &str =
    "Domain Whitelist - Only domains in this list will be allowed access";

/// Access control list over domain names.
///
/// Every stored domain is normalized (see [`normalize_domain`]). Input that
/// normalizes to nothing is dropped silently when building or extending the
/// list; only [`DomainAcl::check`] reports it as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAcl {
    domains: Vec<String>,
    mode: ListMode,
    include_subdomains: bool,
}

impl DomainAcl {
    /// Create a list. Entries may be URLs or hosts in any case.
    pub fn new<I, S>(domains: I, mode: ListMode, include_subdomains: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut acl = Self {
            domains: Vec::new(),
            mode,
            include_subdomains,
        };
        acl.add(domains);
        debug!(
            mode = %mode,
            include_subdomains,
            entries = acl.len(),
            "created domain ACL"
        );
        acl
    }

    /// Create a list from a rule file.
    pub fn from_file(
        path: impl AsRef<Path>,
        mode: ListMode,
        include_subdomains: bool,
    ) -> Result<Self> {
        let domains = rules_file::read_list(path)?;
        Ok(Self::new(domains, mode, include_subdomains))
    }

    /// Add domains. Duplicates (after normalization) and invalid input are skipped.
    pub fn add<I, S>(&mut self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0usize;
        for domain in domains {
            let normalized = normalize_domain(domain.as_ref());
            if normalized.is_empty() {
                trace!(input = domain.as_ref(), "dropping invalid domain");
                continue;
            }
            if self.domains.contains(&normalized) {
                continue;
            }
            self.domains.push(normalized);
            added += 1;
        }

        if added > 0 {
            debug!(added, total = self.domains.len(), "added domain ACL entries");
        }
    }

    /// Add domains from a rule file.
    pub fn add_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let domains = rules_file::read_list(path)?;
        self.add(domains);
        Ok(())
    }

    /// Remove domains. Arguments are normalized before lookup.
    ///
    /// Every domain that is present is removed. If any requested domain was
    /// missing, the call still removes the others and then returns
    /// [`AclError::EntryNotFound`] listing the missing ones. Arguments that
    /// normalize to nothing can never be in the list and are skipped without
    /// being reported.
    pub fn remove<I, S>(&mut self, domains: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested: Vec<String> = Vec::new();
        for domain in domains {
            let normalized = normalize_domain(domain.as_ref());
            if !normalized.is_empty() && !requested.contains(&normalized) {
                requested.push(normalized);
            }
        }

        let missing: Vec<String> = requested
            .iter()
            .filter(|d| !self.domains.contains(d))
            .cloned()
            .collect();

        let before = self.domains.len();
        self.domains.retain(|d| !requested.contains(d));
        debug!(
            removed = before - self.domains.len(),
            total = self.domains.len(),
            "removed domain ACL entries"
        );

        if missing.is_empty() {
            Ok(())
        } else {
            warn!(?missing, "domain ACL entries not found");
            Err(AclError::EntryNotFound(missing))
        }
    }

    /// Check whether a domain (or URL) is allowed.
    pub fn check(&self, domain: &str) -> Result<Permission> {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            return Err(AclError::InvalidDomain(domain.to_string()));
        }

        let permission = self.mode.decide(self.matches(&normalized));
        trace!(domain = %normalized, %permission, "checked domain");
        Ok(permission)
    }

    /// Check a normalized domain against the entries.
    ///
    /// A domain matches an entry when equal to it or, with subdomains
    /// enabled, when it ends with `.` followed by the entry.
    pub fn matches(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }

        self.domains.iter().any(|domain| {
            if self.include_subdomains {
                is_subdomain_or_equal(normalized, domain)
            } else {
                normalized == domain
            }
        })
    }

    /// Normalized entries, in insertion order.
    pub fn domains(&self) -> Vec<String> {
        self.domains.clone()
    }

    /// List mode.
    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Whether subdomains of an entry match it.
    pub fn includes_subdomains(&self) -> bool {
        self.include_subdomains
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Check if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Save the entries to a rule file with a mode-specific header.
    pub fn save_to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let header = match self.mode {
            ListMode::Blacklist => BLACKLIST_HEADER,
            ListMode::Whitelist => WHITELIST_HEADER,
        };
        rules_file::save_list(path, &self.domains, header, overwrite)
    }
}

impl Acl for DomainAcl {
    fn check(&self, value: &str) -> Result<Permission> {
        DomainAcl::check(self, value)
    }
}
