//! Parsing of single addresses and CIDR blocks.

use std::net::IpAddr;

use ipnet::IpNet;

use super::{AclError, Result};

/// One entry of an IP list: a single address or a CIDR block.
///
/// A single address is stored as a full-length block (`/32` or `/128`), so
/// containment and equality are the same test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRange {
    original: String,
    network: IpNet,
}

impl IpRange {
    /// Parse an address or a CIDR block.
    ///
    /// Surrounding whitespace is ignored; the trimmed text is kept verbatim
    /// as the identity of the entry.
    pub fn parse(input: &str) -> Result<Self> {
        let original = input.trim();

        let network = if original.contains('/') {
            original
                .parse::<IpNet>()
                .map_err(|_| AclError::InvalidBlock(original.to_string()))?
        } else {
            let addr = parse_addr(original)?;
            IpNet::new(addr, full_prefix_len(&addr))
                .map_err(|_| AclError::InvalidAddress(original.to_string()))?
        };

        Ok(Self {
            original: original.to_string(),
            network,
        })
    }

    /// The text this range was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The parsed block.
    pub fn network(&self) -> &IpNet {
        &self.network
    }

    /// Check if the block contains `addr`. Never matches across families.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.network.contains(addr)
    }
}

impl std::fmt::Display for IpRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl std::str::FromStr for IpRange {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a bare address (no prefix length), keeping the family it was
/// written in.
pub fn parse_addr(input: &str) -> Result<IpAddr> {
    let input = input.trim();
    input
        .parse::<IpAddr>()
        .map_err(|_| AclError::InvalidAddress(input.to_string()))
}

fn full_prefix_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}
