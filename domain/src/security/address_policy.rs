//! Address ranges an outbound fetch may never reach.
//!
//! | Family | Blocked ranges |
//! |--------|----------------|
//! | IPv4 | `10/8`, `172.16/12`, `192.168/16`, `127/8`, `169.254/16`, `0/8` |
//! | IPv6 | `::1/128`, `::/128`, `fc00::/7`, `fe80::/10`, IPv4-mapped forms of the above |

use super::error::FetchTargetError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// True if the address is private-use, loopback, link-local or unspecified.
pub fn is_blocked_address(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_blocked_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_blocked_v4(v4),
            None => is_blocked_v6(v6),
        },
    }
}

fn is_blocked_v4(addr: Ipv4Addr) -> bool {
    let [a, b, _, _] = addr.octets();
    a == 10
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || a == 127
        || (a == 169 && b == 254)
        || a == 0
}

fn is_blocked_v6(addr: Ipv6Addr) -> bool {
    let first = addr.segments()[0];
    addr == Ipv6Addr::LOCALHOST
        || addr == Ipv6Addr::UNSPECIFIED
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Reject anything but `http://` and `https://` URLs.
pub fn check_scheme(url: &str) -> Result<(), FetchTargetError> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        Ok(())
    } else {
        Err(FetchTargetError::UnsupportedScheme(url.to_string()))
    }
}

/// Check every resolved address of `host`; the first blocked one fails.
pub fn check_resolved(host: &str, addrs: &[IpAddr]) -> Result<(), FetchTargetError> {
    if addrs.is_empty() {
        return Err(FetchTargetError::UnresolvableHost {
            host: host.to_string(),
            reason: "no addresses".to_string(),
        });
    }
    match addrs.iter().find(|addr| is_blocked_address(**addr)) {
        Some(addr) => Err(FetchTargetError::PrivateAddressBlocked {
            host: host.to_string(),
            addr: *addr,
        }),
        None => Ok(()),
    }
}
