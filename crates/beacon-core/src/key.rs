//! Network keys: the address block an announcer is grouped under.
//!
//! Callers never name their group explicitly. The key is derived from the
//! address a request appears to come from:
//!   - IPv4: the exact address, as a /32
//!   - IPv6: the /64 prefix, so every host on one subnet shares a key
//!
//! IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`, as reported by dual-stack
//! listeners) are treated as the IPv4 address they wrap.

use std::fmt;
use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Prefix length for IPv4 keys, one key per address.
pub const IPV4_PREFIX_LEN: u8 = 32;

/// Prefix length for IPv6 keys, one key per subnet.
pub const IPV6_PREFIX_LEN: u8 = 64;

// ── NetworkKey ────────────────────────────────────────────────────────────────

/// Canonical network block that groups announcers.
///
/// Displays in CIDR form, e.g. `203.0.113.5/32` or `2001:db8::/64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkKey(IpNet);

impl NetworkKey {
    /// Key for an already-parsed address.
    pub fn from_ip(addr: IpAddr) -> Self {
        let net = match addr.to_canonical() {
            IpAddr::V4(v4) => IpNet::V4(Ipv4Net::new_assert(v4, IPV4_PREFIX_LEN)),
            IpAddr::V6(v6) => IpNet::V6(Ipv6Net::new_assert(v6, IPV6_PREFIX_LEN).trunc()),
        };
        Self(net)
    }

    /// Key for a textual address. Surrounding whitespace is ignored.
    pub fn parse(addr: &str) -> Result<Self, KeyError> {
        let trimmed = addr.trim();
        trimmed
            .parse::<IpAddr>()
            .map(Self::from_ip)
            .map_err(|_| KeyError::InvalidAddress(trimmed.to_string()))
    }

    /// The network block this key stands for.
    pub fn network(&self) -> IpNet {
        self.0
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.0, IpNet::V4(_))
    }
}

impl fmt::Display for NetworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ── KeyDeriver ────────────────────────────────────────────────────────────────

/// Picks the address a request is attributed to and turns it into a key.
///
/// When `trust_forwarded` is set and the request carries a forwarded-for
/// value, that value wins over the transport peer. A forwarded-for chain
/// (`client, proxy1, proxy2`) is attributed to its left-most entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    trust_forwarded: bool,
}

impl KeyDeriver {
    pub fn new(trust_forwarded: bool) -> Self {
        Self { trust_forwarded }
    }

    pub fn trusts_forwarded(&self) -> bool {
        self.trust_forwarded
    }

    /// Derive the key for a request from `peer` carrying `forwarded_for`.
    pub fn derive(
        &self,
        peer: IpAddr,
        forwarded_for: Option<&str>,
    ) -> Result<NetworkKey, KeyError> {
        match forwarded_for {
            Some(header) if self.trust_forwarded => {
                let client = header.split(',').next().unwrap_or(header);
                NetworkKey::parse(client)
            }
            _ => Ok(NetworkKey::from_ip(peer)),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("can't parse {0:?} as an IP address")]
    InvalidAddress(String),
}
