//! IP access control list.

use std::net::IpAddr;
use std::path::Path;

use tracing::{debug, trace, warn};

use super::{
    AclError, Result,
    decision::{Acl, ListMode, Permission},
    ip_range::{IpRange, parse_addr},
    predefined::PredefinedSet,
    rules_file,
};

const BLACKLIST_HEADER: &str = "IP Blacklist - IPs in this list will be denied access";
const WHITELIST_HEADER: &str = "IP Whitelist - Only IPs in this list will be allowed access";

/// Access control list over single addresses and CIDR blocks.
///
/// Entries keep their insertion order and are identified by the text they
/// were added with: `10.0.0.1` and `10.0.0.1/32` are two different entries
/// that happen to match the same address. Overlapping entries are never
/// merged.
///
/// The list is not synchronized; wrap it (see [`crate::AclManager`]) when it
/// is shared between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpAcl {
    ranges: Vec<IpRange>,
    mode: ListMode,
}

impl IpAcl {
    /// Create a list from addresses and CIDR blocks.
    ///
    /// Blank entries are skipped. Any other invalid entry fails the whole
    /// construction.
    pub fn new<I, S>(ranges: I, mode: ListMode) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut acl = Self::empty(mode);
        acl.add(ranges)?;
        debug!(mode = %mode, entries = acl.len(), "created IP ACL");
        Ok(acl)
    }

    /// Create an empty list.
    pub fn empty(mode: ListMode) -> Self {
        Self {
            ranges: Vec::new(),
            mode,
        }
    }

    /// Create a list and apply predefined sets to it.
    ///
    /// Each set goes through [`IpAcl::add_predefined_set`] with `allow_sets`,
    /// so the sets only end up in the list when that matches the mode.
    pub fn with_defaults<I, S>(
        ranges: I,
        mode: ListMode,
        sets: &[PredefinedSet],
        allow_sets: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut acl = Self::new(ranges, mode)?;
        for set in sets {
            acl.add_predefined_set(*set, allow_sets)?;
        }
        Ok(acl)
    }

    /// Create a list from a rule file.
    pub fn from_file(path: impl AsRef<Path>, mode: ListMode) -> Result<Self> {
        let ranges = rules_file::read_list(path)?;
        Self::new(ranges, mode)
    }

    /// Add addresses or CIDR blocks.
    ///
    /// Blank entries and entries already present (same text) are skipped.
    /// Not atomic: when an entry fails to parse, the entries before it stay
    /// added.
    pub fn add<I, S>(&mut self, ranges: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0usize;
        for entry in ranges {
            let entry = entry.as_ref();
            if entry.trim().is_empty() {
                continue;
            }

            let range = IpRange::parse(entry).inspect_err(|e| {
                warn!(entry, added, error = %e, "rejected IP ACL entry");
            })?;

            if self.ranges.iter().any(|r| r.original() == range.original()) {
                trace!(entry = range.original(), "skipping duplicate IP ACL entry");
                continue;
            }

            self.ranges.push(range);
            added += 1;
        }

        if added > 0 {
            debug!(added, total = self.ranges.len(), "added IP ACL entries");
        }
        Ok(())
    }

    /// Add entries from a rule file.
    pub fn add_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let ranges = rules_file::read_list(path)?;
        self.add(ranges)
    }

    /// Remove entries by the exact text they were added with.
    ///
    /// Every entry that is present is removed. If any requested entry was
    /// missing, the call still removes the others and then returns
    /// [`AclError::EntryNotFound`] listing the missing ones. Blank arguments
    /// can never be in the list and are skipped without being reported.
    pub fn remove<I, S>(&mut self, ranges: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested: Vec<String> = Vec::new();
        for entry in ranges {
            let entry = entry.as_ref().trim();
            if !entry.is_empty() && !requested.iter().any(|r| r == entry) {
                requested.push(entry.to_string());
            }
        }

        let missing: Vec<String> = requested
            .iter()
            .filter(|r| !self.ranges.iter().any(|range| range.original() == r.as_str()))
            .cloned()
            .collect();

        let before = self.ranges.len();
        self.ranges
            .retain(|range| !requested.iter().any(|r| r == range.original()));
        debug!(
            removed = before - self.ranges.len(),
            total = self.ranges.len(),
            "removed IP ACL entries"
        );

        if missing.is_empty() {
            Ok(())
        } else {
            warn!(?missing, "IP ACL entries not found");
            Err(AclError::EntryNotFound(missing))
        }
    }

    /// Merge a predefined set into the list.
    ///
    /// `allow_set` says whether addresses of the set should be allowed. The
    /// blocks are added only when that needs list entries: a blacklist that
    /// should deny them, or a whitelist that should allow them. The other
    /// two combinations succeed without changing anything.
    pub fn add_predefined_set(&mut self, set: PredefinedSet, allow_set: bool) -> Result<()> {
        let absorb = match self.mode {
            ListMode::Blacklist => !allow_set,
            ListMode::Whitelist => allow_set,
        };

        if !absorb {
            debug!(set = %set, mode = %self.mode, allow_set, "predefined set not added");
            return Ok(());
        }

        debug!(set = %set, mode = %self.mode, allow_set, "adding predefined set");
        self.add(set.ranges())
    }

    /// Same as [`IpAcl::add_predefined_set`], looking the set up by name.
    pub fn add_predefined_set_by_name(&mut self, name: &str, allow_set: bool) -> Result<()> {
        let set: PredefinedSet = name.parse()?;
        self.add_predefined_set(set, allow_set)
    }

    /// Check whether an address is allowed.
    ///
    /// Only bare addresses are accepted, not CIDR blocks.
    pub fn check(&self, ip: &str) -> Result<Permission> {
        let addr = parse_addr(ip)?;
        Ok(self.check_addr(addr))
    }

    /// Check an already parsed address.
    pub fn check_addr(&self, addr: IpAddr) -> Permission {
        let permission = self.mode.decide(self.contains(&addr));
        trace!(%addr, %permission, "checked IP");
        permission
    }

    /// Check if any entry contains the address.
    ///
    /// An IPv4-mapped IPv6 address (`::ffff:a.b.c.d`) matches IPv6 blocks as
    /// written and IPv4 blocks through its embedded IPv4 address. A plain
    /// IPv4 address never matches an IPv6 block.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        let canonical = addr.to_canonical();
        self.ranges.iter().any(|range| {
            range.contains(addr) || (canonical != *addr && range.contains(&canonical))
        })
    }

    /// Entries as they were added, in insertion order.
    pub fn ranges(&self) -> Vec<String> {
        self.ranges.iter().map(|r| r.original().to_string()).collect()
    }

    /// Parsed entries, in insertion order.
    pub fn entries(&self) -> &[IpRange] {
        &self.ranges
    }

    /// List mode.
    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Save the entries to a rule file with a mode-specific header.
    pub fn save_to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let header = match self.mode {
            ListMode::Blacklist => BLACKLIST_HEADER,
            ListMode::Whitelist => WHITELIST_HEADER,
        };
        rules_file::save_list(path, &self.ranges(), header, overwrite)
    }
}

impl Acl for IpAcl {
    fn check(&self, value: &str) -> Result<Permission> {
        IpAcl::check(self, value)
    }
}
