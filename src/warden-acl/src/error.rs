//! Error types for access control lists.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the matchers, the rule files and the manager.
#[derive(Debug, Error)]
pub enum AclError {
    /// Text is neither a valid IPv4 nor IPv6 address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Text has a `/` but the address or the prefix length is invalid.
    #[error("invalid CIDR block: {0}")]
    InvalidBlock(String),

    /// Domain normalized to nothing.
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    /// One or more entries requested for removal were not in the list.
    #[error("entry not found: {}", .0.join(", "))]
    EntryNotFound(Vec<String>),

    /// No predefined IP set with this name.
    #[error("unknown predefined IP set: {0}")]
    UnknownCategory(String),

    /// The manager has no list of the requested kind configured.
    #[error("no ACL configured")]
    NoAcl,

    /// Rule file does not exist.
    #[error("rule file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Rule file has no entries once comments and blank lines are dropped.
    #[error("rule file is empty or only contains comments: {}", .0.display())]
    EmptyFile(PathBuf),

    /// Refusing to overwrite an existing rule file.
    #[error("rule file already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Rule file could not be opened or created due to permissions.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AclError {
    /// Returns true for the "not in the list" error of a partial removal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AclError::EntryNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
