//! Canonical in-memory and wire forms for the address families the RIB
//! keys tables by: inet, inet6, inet-vpn, inet6-vpn, evpn, ermvpn, mvpn,
//! rtarget. A `Prefix` is the routing key; per-family payload (label,
//! path attributes) lives on the path that carries it, not here.

pub mod ermvpn;
pub mod evpn;
pub mod inet;
pub mod inet6;
pub mod inet6_vpn;
pub mod inet_vpn;
pub mod mvpn;
pub mod rtarget;

pub use ermvpn::ErmVpnPrefix;
pub use evpn::EvpnPrefix;
pub use inet::InetPrefix;
pub use inet6::Inet6Prefix;
pub use inet6_vpn::Inet6VpnPrefix;
pub use inet_vpn::InetVpnPrefix;
pub use mvpn::MvpnPrefix;
pub use rtarget::RTargetPrefix;

use std::cmp::Ordering;
use std::fmt;

/// A malformed textual or wire-form prefix. Carries enough context for
/// the caller to report an offset without this module depending on the
/// message-level error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixError(pub String);

impl fmt::Display for PrefixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PrefixError {}

/// Address-family tag, used to discriminate a `Prefix` without matching
/// on the full enum and to reject cross-family comparisons cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Inet,
    Inet6,
    InetVpn,
    Inet6Vpn,
    Evpn,
    ErmVpn,
    Mvpn,
    RTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prefix {
    Inet(InetPrefix),
    Inet6(Inet6Prefix),
    InetVpn(InetVpnPrefix),
    Inet6Vpn(Inet6VpnPrefix),
    Evpn(EvpnPrefix),
    ErmVpn(ErmVpnPrefix),
    Mvpn(MvpnPrefix),
    RTarget(RTargetPrefix),
}

impl Prefix {
    pub fn family(&self) -> Family {
        match self {
            Prefix::Inet(_) => Family::Inet,
            Prefix::Inet6(_) => Family::Inet6,
            Prefix::InetVpn(_) => Family::InetVpn,
            Prefix::Inet6Vpn(_) => Family::Inet6Vpn,
            Prefix::Evpn(_) => Family::Evpn,
            Prefix::ErmVpn(_) => Family::ErmVpn,
            Prefix::Mvpn(_) => Family::Mvpn,
            Prefix::RTarget(_) => Family::RTarget,
        }
    }

    /// Total order within a family; prefixes from different families
    /// order by family tag first so they can still share a `BTreeMap`.
    pub fn compare_to(&self, other: &Prefix) -> Ordering {
        match (self, other) {
            (Prefix::Inet(a), Prefix::Inet(b)) => a.cmp(b),
            (Prefix::Inet6(a), Prefix::Inet6(b)) => a.cmp(b),
            (Prefix::InetVpn(a), Prefix::InetVpn(b)) => a.cmp(b),
            (Prefix::Inet6Vpn(a), Prefix::Inet6Vpn(b)) => a.cmp(b),
            (Prefix::Evpn(a), Prefix::Evpn(b)) => a.cmp(b),
            (Prefix::ErmVpn(a), Prefix::ErmVpn(b)) => a.cmp(b),
            (Prefix::Mvpn(a), Prefix::Mvpn(b)) => a.cmp(b),
            (Prefix::RTarget(a), Prefix::RTarget(b)) => a.cmp(b),
            _ => self.family().cmp(&other.family()),
        }
    }

    pub fn is_more_specific(&self, other: &Prefix) -> bool {
        match (self, other) {
            (Prefix::Inet(a), Prefix::Inet(b)) => a.is_more_specific(b),
            (Prefix::Inet6(a), Prefix::Inet6(b)) => a.is_more_specific(b),
            (Prefix::InetVpn(a), Prefix::InetVpn(b)) => a.is_more_specific(b),
            (Prefix::Inet6Vpn(a), Prefix::Inet6Vpn(b)) => a.is_more_specific(b),
            _ => false,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Inet(p) => write!(f, "{p}"),
            Prefix::Inet6(p) => write!(f, "{p}"),
            Prefix::InetVpn(p) => write!(f, "{p}"),
            Prefix::Inet6Vpn(p) => write!(f, "{p}"),
            Prefix::Evpn(p) => write!(f, "{p}"),
            Prefix::ErmVpn(p) => write!(f, "{p}"),
            Prefix::Mvpn(p) => write!(f, "{p}"),
            Prefix::RTarget(p) => write!(f, "{p}"),
        }
    }
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Ord for Prefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cross_family_orders_by_family_tag() {
        let a = Prefix::Inet(InetPrefix::from_str("10.0.0.0/24").unwrap());
        let b = Prefix::Inet6(Inet6Prefix::from_str("2001:db8::/32").unwrap());
        assert_eq!(a.compare_to(&b), Ordering::Less);
    }
}
