//! Allow/deny decisions shared by the IP and domain lists.

use serde::{Deserialize, Serialize};

use super::Result;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Access is denied.
    Denied,

    /// Access is allowed.
    Allowed,
}

impl Permission {
    /// Check if the permission allows access.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Permission::Allowed)
    }

    /// Check if the permission denies access.
    pub fn is_denied(&self) -> bool {
        matches!(self, Permission::Denied)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Denied => write!(f, "denied"),
            Permission::Allowed => write!(f, "allowed"),
        }
    }
}

/// How the entries of a list are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// Listed entries are denied, everything else is allowed.
    #[default]
    Blacklist,

    /// Only listed entries are allowed.
    Whitelist,
}

impl ListMode {
    /// Turn a match result into a permission.
    ///
    /// This is the only place where list semantics live; both the IP and
    /// the domain list go through it.
    pub fn decide(self, matched: bool) -> Permission {
        match (self, matched) {
            (ListMode::Blacklist, true) | (ListMode::Whitelist, false) => Permission::Denied,
            (ListMode::Blacklist, false) | (ListMode::Whitelist, true) => Permission::Allowed,
        }
    }

    /// Get a description of the mode.
    pub fn description(&self) -> &str {
        match self {
            ListMode::Blacklist => "listed entries are denied, everything else is allowed",
            ListMode::Whitelist => "only listed entries are allowed",
        }
    }
}

impl std::fmt::Display for ListMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListMode::Blacklist => write!(f, "blacklist"),
            ListMode::Whitelist => write!(f, "whitelist"),
        }
    }
}

impl std::str::FromStr for ListMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blacklist" | "denylist" | "deny" => Ok(ListMode::Blacklist),
            "whitelist" | "allowlist" | "allow" => Ok(ListMode::Whitelist),
            _ => Err(format!("Unknown list mode: {}", s)),
        }
    }
}

/// Anything that can turn a request attribute into a permission.
///
/// Implemented by [`crate::IpAcl`] and [`crate::DomainAcl`] so callers can
/// hold either behind `&dyn Acl`.
pub trait Acl {
    /// Check whether `value` is allowed.
    fn check(&self, value: &str) -> Result<Permission>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_blacklist() {
        assert_eq!(ListMode::Blacklist.decide(true), Permission::Denied);
        assert_eq!(ListMode::Blacklist.decide(false), Permission::Allowed);
    }

    #[test]
    fn test_decide_whitelist() {
        assert_eq!(ListMode::Whitelist.decide(true), Permission::Allowed);
        assert_eq!(ListMode::Whitelist.decide(false), Permission::Denied);
    }

    #[test]
    fn test_decide_symmetry() {
        for mode in [ListMode::Blacklist, ListMode::Whitelist] {
            for matched in [true, false] {
                let denied = mode.decide(matched).is_denied();
                assert_eq!(denied, (mode == ListMode::Blacklist) == matched);
            }
        }
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Permission::Allowed.to_string(), "allowed");
        assert_eq!(Permission::Denied.to_string(), "denied");
        assert_eq!(ListMode::Blacklist.to_string(), "blacklist");
        assert_eq!("Whitelist".parse::<ListMode>().unwrap(), ListMode::Whitelist);
        assert_eq!("denylist".parse::<ListMode>().unwrap(), ListMode::Blacklist);
        assert!("greylist".parse::<ListMode>().is_err());
    }

    #[test]
    fn test_default_mode_is_blacklist() {
        assert_eq!(ListMode::default(), ListMode::Blacklist);
    }
}
