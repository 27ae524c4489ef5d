//! Predefined IP sets for SSRF hardening.
//!
//! Each [`PredefinedSet`] names a well-known class of network (private,
//! loopback, cloud metadata, ...). The catalog is built once on first use and
//! never changes afterwards; [`PredefinedSet::AllSpecialNetworks`] is the
//! deduplicated union of every other set, in declaration order.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::AclError;

/// Name of a predefined IP set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredefinedSet {
    /// RFC 1918 private networks.
    PrivateNetworks,
    /// Loopback addresses.
    LoopbackNetworks,
    /// Link-local addresses.
    LinkLocalNetworks,
    /// Cloud provider metadata services.
    CloudMetadata,
    /// Docker default bridge.
    DockerNetworks,
    /// Well-known public DNS resolvers.
    PublicDns,
    /// Limited broadcast.
    BroadcastAddresses,
    /// Multicast.
    MulticastNetworks,
    /// Reserved and special-purpose ranges.
    ReservedNetworks,
    /// Documentation ranges (TEST-NET-1/2/3, 2001:db8::/32).
    TestNetworks,
    /// Default Kubernetes service CIDR.
    KubernetesServiceNetworks,
    /// Shared address space (RFC 6598).
    CarrierGradeNat,
    /// IPv6 unique local addresses (RFC 4193).
    UniqueLocalNetworks,
    /// Union of every set above.
    AllSpecialNetworks,
}

const PRIVATE_NETWORKS: &[&str] = &["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

const LOOPBACK_NETWORKS: &[&str] = &["127.0.0.0/8", "::1/128"];

const LINK_LOCAL_NETWORKS: &[&str] = &["169.254.0.0/16", "fe80::/10"];

const CLOUD_METADATA: &[&str] = &[
    "169.254.169.254/32", // AWS, GCP, OpenStack
    "169.254.170.2/32",   // AWS ECS task metadata
    "fd00:ec2::254/128",  // AWS IMDS over IPv6
];

const DOCKER_NETWORKS: &[&str] = &["172.17.0.0/16"];

const PUBLIC_DNS: &[&str] = &[
    "8.8.8.8/32",
    "8.8.4.4/32",
    "1.1.1.1/32",
    "1.0.0.1/32",
    "9.9.9.9/32",
    "149.112.112.112/32",
    "208.67.222.222/32",
    "208.67.220.220/32",
    "2001:4860:4860::8888/128",
    "2001:4860:4860::8844/128",
    "2606:4700:4700::1111/128",
    "2606:4700:4700::1001/128",
];

const BROADCAST_ADDRESSES: &[&str] = &["255.255.255.255/32"];

const MULTICAST_NETWORKS: &[&str] = &["224.0.0.0/4", "ff00::/8"];

const RESERVED_NETWORKS: &[&str] = &[
    "0.0.0.0/8",     // "this network" (RFC 1122)
    "192.0.0.0/24",  // IETF protocol assignments (RFC 6890)
    "198.18.0.0/15", // benchmarking (RFC 2544)
    "240.0.0.0/4",   // reserved for future use
    "::/128",
    "100::/64", // discard prefix (RFC 6666)
];

const TEST_NETWORKS: &[&str] = &[
    "192.0.2.0/24",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "2001:db8::/32",
];

const KUBERNETES_SERVICE_NETWORKS: &[&str] = &["10.96.0.0/12"];

const CARRIER_GRADE_NAT: &[&str] = &["100.64.0.0/10"];

const UNIQUE_LOCAL_NETWORKS: &[&str] = &["fc00::/7"];

impl PredefinedSet {
    /// Every set, in catalog order.
    pub const ALL: [PredefinedSet; 14] = [
        PredefinedSet::PrivateNetworks,
        PredefinedSet::LoopbackNetworks,
        PredefinedSet::LinkLocalNetworks,
        PredefinedSet::CloudMetadata,
        PredefinedSet::DockerNetworks,
        PredefinedSet::PublicDns,
        PredefinedSet::BroadcastAddresses,
        PredefinedSet::MulticastNetworks,
        PredefinedSet::ReservedNetworks,
        PredefinedSet::TestNetworks,
        PredefinedSet::KubernetesServiceNetworks,
        PredefinedSet::CarrierGradeNat,
        PredefinedSet::UniqueLocalNetworks,
        PredefinedSet::AllSpecialNetworks,
    ];

    /// Stable name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PredefinedSet::PrivateNetworks => "private_networks",
            PredefinedSet::LoopbackNetworks => "loopback_networks",
            PredefinedSet::LinkLocalNetworks => "link_local_networks",
            PredefinedSet::CloudMetadata => "cloud_metadata",
            PredefinedSet::DockerNetworks => "docker_networks",
            PredefinedSet::PublicDns => "public_dns",
            PredefinedSet::BroadcastAddresses => "broadcast_addresses",
            PredefinedSet::MulticastNetworks => "multicast_networks",
            PredefinedSet::ReservedNetworks => "reserved_networks",
            PredefinedSet::TestNetworks => "test_networks",
            PredefinedSet::KubernetesServiceNetworks => "kubernetes_service_networks",
            PredefinedSet::CarrierGradeNat => "carrier_grade_nat",
            PredefinedSet::UniqueLocalNetworks => "unique_local_networks",
            PredefinedSet::AllSpecialNetworks => "all_special_networks",
        }
    }

    /// Blocks of this set, from the shared catalog.
    pub fn ranges(&self) -> &'static [&'static str] {
        catalog().get(*self)
    }

    fn base_ranges(&self) -> &'static [&'static str] {
        match self {
            PredefinedSet::PrivateNetworks => PRIVATE_NETWORKS,
            PredefinedSet::LoopbackNetworks => LOOPBACK_NETWORKS,
            PredefinedSet::LinkLocalNetworks => LINK_LOCAL_NETWORKS,
            PredefinedSet::CloudMetadata => CLOUD_METADATA,
            PredefinedSet::DockerNetworks => DOCKER_NETWORKS,
            PredefinedSet::PublicDns => PUBLIC_DNS,
            PredefinedSet::BroadcastAddresses => BROADCAST_ADDRESSES,
            PredefinedSet::MulticastNetworks => MULTICAST_NETWORKS,
            PredefinedSet::ReservedNetworks => RESERVED_NETWORKS,
            PredefinedSet::TestNetworks => TEST_NETWORKS,
            PredefinedSet::KubernetesServiceNetworks => KUBERNETES_SERVICE_NETWORKS,
            PredefinedSet::CarrierGradeNat => CARRIER_GRADE_NAT,
            PredefinedSet::UniqueLocalNetworks => UNIQUE_LOCAL_NETWORKS,
            PredefinedSet::AllSpecialNetworks => &[],
        }
    }
}

impl std::fmt::Display for PredefinedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PredefinedSet {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PredefinedSet::ALL
            .into_iter()
            .find(|set| set.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| AclError::UnknownCategory(name.to_string()))
    }
}

/// Immutable mapping from set to its CIDR blocks.
#[derive(Debug, Clone)]
pub struct PredefinedCatalog {
    sets: IndexMap<PredefinedSet, Vec<&'static str>>,
}

impl PredefinedCatalog {
    /// Build the catalog from the constant tables.
    pub fn build() -> Self {
        let mut sets = IndexMap::with_capacity(PredefinedSet::ALL.len());
        let mut all: Vec<&'static str> = Vec::new();

        for set in PredefinedSet::ALL {
            if set == PredefinedSet::AllSpecialNetworks {
                continue;
            }
            let ranges = set.base_ranges();
            for range in ranges {
                if !all.contains(range) {
                    all.push(*range);
                }
            }
            sets.insert(set, ranges.to_vec());
        }
        sets.insert(PredefinedSet::AllSpecialNetworks, all);

        Self { sets }
    }

    /// Blocks of a set.
    pub fn get(&self, set: PredefinedSet) -> &[&'static str] {
        self.sets.get(&set).map(Vec::as_slice).unwrap_or_default()
    }

    /// Blocks of a set looked up by name; `None` if no such set exists.
    pub fn lookup(&self, name: &str) -> Option<&[&'static str]> {
        name.parse::<PredefinedSet>().ok().map(|set| self.get(set))
    }

    /// Iterate over every set and its blocks, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (PredefinedSet, &[&'static str])> {
        self.sets.iter().map(|(set, ranges)| (*set, ranges.as_slice()))
    }

    /// Number of sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

static CATALOG: LazyLock<PredefinedCatalog> = LazyLock::new(PredefinedCatalog::build);

/// The process-wide catalog, built on first use.
pub fn catalog() -> &'static PredefinedCatalog {
    &CATALOG
}

/// Look up a set by name in the shared catalog.
pub fn lookup(name: &str) -> Option<&'static [&'static str]> {
    catalog().lookup(name)
}
