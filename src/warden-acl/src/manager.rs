//! Thread-safe owner of one IP list and one domain list.

use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{
    AclConfig, AclError, DomainAcl, IpAcl, ListMode, Permission, PredefinedSet, Result,
};

#[derive(Debug, Default)]
struct Lists {
    ip: Option<IpAcl>,
    domain: Option<DomainAcl>,
}

/// Holds an optional [`IpAcl`] and an optional [`DomainAcl`] behind one
/// reader/writer lock.
///
/// Mutations take the write lock, checks and listings take the read lock.
/// New lists are parsed before the lock is taken, so a failed replacement
/// leaves the current list untouched. Operations on a list that was never
/// configured return [`AclError::NoAcl`].
#[derive(Debug, Default)]
pub struct AclManager {
    lists: RwLock<Lists>,
}

impl AclManager {
    /// Create a manager with no lists configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager from configuration.
    ///
    /// IP list: `ranges`, then the entries of `file`, then the predefined
    /// sets. Domain list: `domains`, then the entries of `file`.
    pub fn from_config(config: &AclConfig) -> Result<Self> {
        let mut lists = Lists::default();

        if let Some(ip) = &config.ip {
            let mut acl = IpAcl::new(&ip.ranges, ip.mode)?;
            if let Some(file) = &ip.file {
                acl.add_from_file(file)?;
            }
            for set in &ip.predefined_sets {
                acl.add_predefined_set(*set, ip.allow_predefined)?;
            }
            lists.ip = Some(acl);
        }

        if let Some(domain) = &config.domain {
            let mut acl = DomainAcl::new(&domain.domains, domain.mode, domain.include_subdomains);
            if let Some(file) = &domain.file {
                acl.add_from_file(file)?;
            }
            lists.domain = Some(acl);
        }

        info!(
            ip_entries = lists.ip.as_ref().map(IpAcl::len),
            domain_entries = lists.domain.as_ref().map(DomainAcl::len),
            "ACL manager configured"
        );
        Ok(Self {
            lists: RwLock::new(lists),
        })
    }

    // ------------------------------------------------------------------
    // Replacement
    // ------------------------------------------------------------------

    /// Replace the domain list.
    pub fn set_domain_acl<I, S>(&self, domains: I, mode: ListMode, include_subdomains: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.replace_domain(DomainAcl::new(domains, mode, include_subdomains));
    }

    /// Replace the domain list with the entries of a rule file.
    pub fn set_domain_acl_from_file(
        &self,
        path: impl AsRef<Path>,
        mode: ListMode,
        include_subdomains: bool,
    ) -> Result<()> {
        let acl = DomainAcl::from_file(path, mode, include_subdomains)?;
        self.replace_domain(acl);
        Ok(())
    }

    /// Replace the IP list.
    pub fn set_ip_acl<I, S>(&self, ranges: I, mode: ListMode) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let acl = IpAcl::new(ranges, mode)?;
        self.replace_ip(acl);
        Ok(())
    }

    /// Replace the IP list with the entries of a rule file.
    pub fn set_ip_acl_from_file(&self, path: impl AsRef<Path>, mode: ListMode) -> Result<()> {
        let acl = IpAcl::from_file(path, mode)?;
        self.replace_ip(acl);
        Ok(())
    }

    /// Replace the IP list, applying predefined sets (see [`IpAcl::with_defaults`]).
    pub fn set_ip_acl_with_defaults<I, S>(
        &self,
        ranges: I,
        mode: ListMode,
        sets: &[PredefinedSet],
        allow_sets: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let acl = IpAcl::with_defaults(ranges, mode, sets, allow_sets)?;
        self.replace_ip(acl);
        Ok(())
    }

    fn replace_ip(&self, acl: IpAcl) {
        debug!(mode = %acl.mode(), entries = acl.len(), "replacing IP ACL");
        self.lists.write().ip = Some(acl);
    }

    fn replace_domain(&self, acl: DomainAcl) {
        debug!(mode = %acl.mode(), entries = acl.len(), "replacing domain ACL");
        self.lists.write().domain = Some(acl);
    }

    /// Drop both lists.
    pub fn reset(&self) {
        let mut lists = self.lists.write();
        lists.ip = None;
        lists.domain = None;
        debug!("ACL manager reset");
    }

    // ------------------------------------------------------------------
    // IP list
    // ------------------------------------------------------------------

    /// Add addresses or CIDR blocks. See [`IpAcl::add`].
    pub fn add_ip<I, S>(&self, ranges: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_ip_mut(|acl| acl.add(ranges))
    }

    /// Add entries from a rule file. The file is read before locking.
    pub fn add_ip_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ranges = super::rules_file::read_list(path)?;
        self.add_ip(ranges)
    }

    /// Remove addresses or CIDR blocks. See [`IpAcl::remove`].
    pub fn remove_ip<I, S>(&self, ranges: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_ip_mut(|acl| acl.remove(ranges))
    }

    /// Merge a predefined set. See [`IpAcl::add_predefined_set`].
    pub fn add_predefined_ip_set(&self, set: PredefinedSet, allow_set: bool) -> Result<()> {
        self.with_ip_mut(|acl| acl.add_predefined_set(set, allow_set))
    }

    /// Deny every special network.
    pub fn add_all_special_networks(&self) -> Result<()> {
        self.add_predefined_ip_set(PredefinedSet::AllSpecialNetworks, false)
    }

    /// Check an address.
    pub fn check_ip(&self, ip: &str) -> Result<Permission> {
        self.with_ip(|acl| acl.check(ip))?
    }

    /// Current IP entries, or `None` when no IP list is configured.
    pub fn ip_ranges(&self) -> Option<Vec<String>> {
        self.lists.read().ip.as_ref().map(IpAcl::ranges)
    }

    /// Mode of the IP list.
    pub fn ip_list_mode(&self) -> Result<ListMode> {
        self.with_ip(IpAcl::mode)
    }

    /// Save the IP list to a rule file.
    pub fn save_ip_acl_to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        self.with_ip(|acl| acl.save_to_file(path, overwrite))?
    }

    fn with_ip<T>(&self, f: impl FnOnce(&IpAcl) -> T) -> Result<T> {
        let lists = self.lists.read();
        lists.ip.as_ref().map(f).ok_or(AclError::NoAcl)
    }

    fn with_ip_mut<T>(&self, f: impl FnOnce(&mut IpAcl) -> Result<T>) -> Result<T> {
        let mut lists = self.lists.write();
        lists.ip.as_mut().ok_or(AclError::NoAcl).and_then(f)
    }

    // ------------------------------------------------------------------
    // Domain list
    // ------------------------------------------------------------------

    /// Add domains. See [`DomainAcl::add`].
    pub fn add_domain<I, S>(&self, domains: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lists = self.lists.write();
        let acl = lists.domain.as_mut().ok_or(AclError::NoAcl)?;
        acl.add(domains);
        Ok(())
    }

    /// Remove domains. See [`DomainAcl::remove`].
    pub fn remove_domain<I, S>(&self, domains: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lists = self.lists.write();
        let acl = lists.domain.as_mut().ok_or(AclError::NoAcl)?;
        acl.remove(domains)
    }

    /// Check a domain or URL.
    pub fn check_domain(&self, domain: &str) -> Result<Permission> {
        self.with_domain(|acl| acl.check(domain))?
    }

    /// Current domain entries, or `None` when no domain list is configured.
    pub fn domains(&self) -> Option<Vec<String>> {
        self.lists.read().domain.as_ref().map(DomainAcl::domains)
    }

    /// Mode of the domain list.
    pub fn domain_list_mode(&self) -> Result<ListMode> {
        self.with_domain(DomainAcl::mode)
    }

    /// Save the domain list to a rule file.
    pub fn save_domain_acl_to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        self.with_domain(|acl| acl.save_to_file(path, overwrite))?
    }

    fn with_domain<T>(&self, f: impl FnOnce(&DomainAcl) -> T) -> Result<T> {
        let lists = self.lists.read();
        lists.domain.as_ref().map(f).ok_or(AclError::NoAcl)
    }
}
