//! Access control configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AclError, ListMode, PredefinedSet, Result};

/// Configuration for the IP list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAclConfig {
    /// List mode.
    #[serde(default)]
    pub mode: ListMode,

    /// Addresses and CIDR blocks.
    #[serde(default)]
    pub ranges: Vec<String>,

    /// Predefined sets to apply after the ranges.
    #[serde(default)]
    pub predefined_sets: Vec<PredefinedSet>,

    /// Whether addresses in `predefined_sets` should be allowed.
    #[serde(default)]
    pub allow_predefined: bool,

    /// Rule file whose entries are added after `ranges`.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Configuration for the domain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAclConfig {
    /// List mode.
    #[serde(default)]
    pub mode: ListMode,

    /// Domains or URLs.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Whether subdomains of an entry match it.
    #[serde(default = "default_include_subdomains")]
    pub include_subdomains: bool,

    /// Rule file whose entries are added after `domains`.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_include_subdomains() -> bool {
    true
}

impl Default for DomainAclConfig {
    fn default() -> Self {
        Self {
            mode: ListMode::default(),
            domains: Vec::new(),
            include_subdomains: default_include_subdomains(),
            file: None,
        }
    }
}

/// Top-level configuration. Either list may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclConfig {
    /// IP list.
    #[serde(default)]
    pub ip: Option<IpAclConfig>,

    /// Domain list.
    #[serde(default)]
    pub domain: Option<DomainAclConfig>,
}

impl AclConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuration.
    pub fn builder() -> AclConfigBuilder {
        AclConfigBuilder::new()
    }

    /// Config that denies every special network and allows everything else.
    pub fn ssrf_protection() -> Self {
        Self {
            ip: Some(IpAclConfig {
                mode: ListMode::Blacklist,
                predefined_sets: vec![PredefinedSet::AllSpecialNetworks],
                allow_predefined: false,
                ..Default::default()
            }),
            domain: None,
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AclError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AclError::FileNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => AclError::PermissionDenied(path.to_path_buf()),
            _ => AclError::Io(e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AclError::Config(e.to_string()))
    }
}

/// Builder for AclConfig.
#[derive(Debug, Default)]
pub struct AclConfigBuilder {
    config: AclConfig,
}

impl AclConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: AclConfig::new(),
        }
    }

    fn ip(&mut self) -> &mut IpAclConfig {
        self.config.ip.get_or_insert_with(IpAclConfig::default)
    }

    fn domain(&mut self) -> &mut DomainAclConfig {
        self.config.domain.get_or_insert_with(DomainAclConfig::default)
    }

    /// Set the IP list mode.
    pub fn ip_mode(mut self, mode: ListMode) -> Self {
        self.ip().mode = mode;
        self
    }

    /// Add an address or CIDR block.
    pub fn ip_range(mut self, range: impl Into<String>) -> Self {
        self.ip().ranges.push(range.into());
        self
    }

    /// Add multiple addresses or CIDR blocks.
    pub fn ip_ranges(mut self, ranges: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let ip = self.ip();
        for range in ranges {
            ip.ranges.push(range.into());
        }
        self
    }

    /// Add a predefined set.
    pub fn predefined_set(mut self, set: PredefinedSet) -> Self {
        self.ip().predefined_sets.push(set);
        self
    }

    /// Set whether predefined sets are allowed or denied.
    pub fn allow_predefined(mut self, allow: bool) -> Self {
        self.ip().allow_predefined = allow;
        self
    }

    /// Set the IP rule file.
    pub fn ip_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ip().file = Some(path.into());
        self
    }

    /// Set the domain list mode.
    pub fn domain_mode(mut self, mode: ListMode) -> Self {
        self.domain().mode = mode;
        self
    }

    /// Add a domain.
    pub fn domain_entry(mut self, domain: impl Into<String>) -> Self {
        self.domain().domains.push(domain.into());
        self
    }

    /// Add multiple domains.
    pub fn domain_entries(mut self, domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let domain = self.domain();
        for entry in domains {
            domain.domains.push(entry.into());
        }
        self
    }

    /// Set whether subdomains match.
    pub fn include_subdomains(mut self, include: bool) -> Self {
        self.domain().include_subdomains = include;
        self
    }

    /// Set the domain rule file.
    pub fn domain_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.domain().file = Some(path.into());
        self
    }

    /// Build the config.
    pub fn build(self) -> AclConfig {
        self.config
    }
}
