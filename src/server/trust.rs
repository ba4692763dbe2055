//! Network trust gate
//!
//! Derives the caller's network origin from request metadata and decides
//! whether the request may bypass the permission engine. Addresses inside
//! the configured local-network allowlist are trusted unconditionally;
//! everything else, including any origin-resolution failure, goes through
//! identity resolution and fails closed there.

use crate::error::ConfigError;
use crate::identity::{RequestMetadata, FORWARDED_FOR, REAL_IP};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A parsed CIDR network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    addr: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Parse `addr/prefix` notation; a bare address means a host route
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid_pattern(s, e.to_string()))?;

        let max_prefix = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        let prefix = match prefix_part {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= max_prefix)
                .ok_or_else(|| ConfigError::invalid_pattern(s, "invalid prefix length"))?,
            None => max_prefix,
        };

        Ok(Self { addr, prefix })
    }

    /// Whether the address falls inside this network
    pub fn contains(&self, candidate: IpAddr) -> bool {
        match (self.addr, candidate) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = prefix_mask_v4(self.prefix);
                (u32::from(net) & mask) == (u32::from(ip) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = prefix_mask_v6(self.prefix);
                (u128::from(net) & mask) == (u128::from(ip) & mask)
            }
            _ => false,
        }
    }
}

fn prefix_mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    }
}

fn prefix_mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - prefix)
    }
}

/// Allowlist of networks trusted to bypass authorization
#[derive(Debug, Clone)]
pub struct TrustedNetworks {
    networks: Vec<Cidr>,
}

impl Default for TrustedNetworks {
    /// Standard private ranges plus loopback
    fn default() -> Self {
        Self {
            networks: vec![
                Cidr {
                    addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 0)),
                    prefix: 8,
                },
                Cidr {
                    addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)),
                    prefix: 8,
                },
                Cidr {
                    addr: IpAddr::V4(Ipv4Addr::new(172, 16, 0, 0)),
                    prefix: 12,
                },
                Cidr {
                    addr: IpAddr::V4(Ipv4Addr::new(192, 168, 0, 0)),
                    prefix: 16,
                },
                Cidr {
                    addr: IpAddr::V6(Ipv6Addr::LOCALHOST),
                    prefix: 128,
                },
            ],
        }
    }
}

impl TrustedNetworks {
    /// Parse an allowlist from configuration; an empty list selects the
    /// default private ranges
    pub fn parse(entries: &[String]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Ok(Self::default());
        }
        let networks = entries
            .iter()
            .map(|e| Cidr::parse(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { networks })
    }

    /// Whether the address is inside any allowlisted network
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.networks.iter().any(|n| n.contains(addr))
    }
}

/// Resolve the caller's network origin from request metadata
///
/// The forwarded-address hint wins when present; a malformed value there
/// is a resolution failure, never a fallback to the direct origin. Without
/// a forwarded hint the direct origin (real-ip metadata, as filled in from
/// the socket peer by the transport) is used.
pub fn client_origin(metadata: &RequestMetadata) -> Option<IpAddr> {
    if let Some(forwarded) = metadata.get(FORWARDED_FOR) {
        // First hop of a comma-separated chain.
        let first = forwarded.split(',').next().unwrap_or(forwarded).trim();
        return first.parse().ok();
    }

    let direct = metadata.get(REAL_IP)?;
    direct.trim().parse().ok()
}
