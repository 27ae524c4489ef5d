//! IP and domain access control lists.
//!
//! This crate provides:
//! - IP lists over single addresses and CIDR blocks (IPv4 and IPv6)
//! - Domain lists with URL-tolerant normalization and optional subdomain matching
//! - Blacklist/whitelist modes sharing one decision rule
//! - Predefined network sets for SSRF protection (private, loopback,
//!   link-local, cloud metadata, ...)
//! - Line-oriented rule files and TOML configuration
//! - A thread-safe manager holding one list of each kind
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AclManager (RwLock)                     │
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐ │
//! │  │          IpAcl           │  │        DomainAcl         │ │
//! │  │  - IpRange (ipnet)       │  │  - normalize_domain      │ │
//! │  │  - PredefinedCatalog     │  │  - is_strict_subdomain   │ │
//! │  └────────────┬─────────────┘  └────────────┬─────────────┘ │
//! │               └──────── ListMode::decide ───┘               │
//! │                         rules_file / AclConfig              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_acl::{AclManager, ListMode, Permission, PredefinedSet};
//!
//! let manager = AclManager::new();
//! manager.set_ip_acl_with_defaults(
//!     ["203.0.113.7"],
//!     ListMode::Blacklist,
//!     &[PredefinedSet::AllSpecialNetworks],
//!     false,
//! )?;
//! manager.set_domain_acl(["example.com"], ListMode::Whitelist, true);
//!
//! assert_eq!(manager.check_ip("169.254.169.254")?, Permission::Denied);
//! assert_eq!(manager.check_domain("https://api.example.com/v1")?, Permission::Allowed);
//! ```

pub mod config;
pub mod decision;
pub mod domain;
pub mod error;
pub mod host;
pub mod ip;
pub mod ip_range;
pub mod manager;
pub mod predefined;
pub mod rules_file;

pub use config::{AclConfig, AclConfigBuilder, DomainAclConfig, IpAclConfig};
pub use decision::{Acl, ListMode, Permission};
pub use domain::DomainAcl;
pub use error::{AclError, Result};
pub use host::{is_strict_subdomain, is_subdomain_or_equal, normalize_domain};
pub use ip::IpAcl;
pub use ip_range::{IpRange, parse_addr};
pub use manager::AclManager;
pub use predefined::{PredefinedCatalog, PredefinedSet, catalog, lookup};
pub use rules_file::{read_list, save_list};
