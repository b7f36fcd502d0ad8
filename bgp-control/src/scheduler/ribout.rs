//! RibOut: a per-(table, export-policy) outbound channel (§4.F).

use bit_vec::BitVec;

use crate::rib::instance::InstanceName;

pub type RibOutId = u64;
pub type PeerId = u32;

/// Export policy tuple. Two `Locate` calls with identical policies
/// return the same `RibOut`; any differing field makes them distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RibOutPolicy {
    pub encoding: Encoding,
    pub session_type: SessionType,
    pub as_number: u32,
    pub as_override: bool,
    pub llgr_enabled: bool,
    pub ipv6_address_family: bool,
    pub cluster_id: u32,
    pub nexthop_override: Option<std::net::IpAddr>,
    pub tunnel_encap_list: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Bgp,
    Xmpp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionType {
    IBgp,
    EBgp,
    Xmpp,
}

/// An outbound channel for one table under one export policy. Holds a
/// dense bitset of registered peer indices; growing it is the only
/// mutation allowed outside of `PeerMembership` (§5 shared-resource
/// policy).
pub struct RibOut {
    pub id: RibOutId,
    pub table: InstanceName,
    pub policy: RibOutPolicy,
    peers: BitVec,
}

impl RibOut {
    pub fn new(id: RibOutId, table: InstanceName, policy: RibOutPolicy) -> Self {
        RibOut { id, table, policy, peers: BitVec::new() }
    }

    pub fn add_peer(&mut self, peer: PeerId) {
        let idx = peer as usize;
        if idx >= self.peers.len() {
            self.peers.grow(idx + 1 - self.peers.len(), false);
        }
        self.peers.set(idx, true);
    }

    pub fn remove_peer(&mut self, peer: PeerId) {
        let idx = peer as usize;
        if idx < self.peers.len() {
            self.peers.set(idx, false);
        }
    }

    pub fn has_peer(&self, peer: PeerId) -> bool {
        self.peers.get(peer as usize).unwrap_or(false)
    }

    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.iter().enumerate().filter_map(|(idx, set)| set.then_some(idx as PeerId))
    }

    pub fn peer_count(&self) -> usize {
        self.peers.iter().filter(|b| *b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RibOutPolicy {
        RibOutPolicy {
            encoding: Encoding::Bgp,
            session_type: SessionType::EBgp,
            as_number: 65000,
            as_override: false,
            llgr_enabled: false,
            ipv6_address_family: false,
            cluster_id: 0,
            nexthop_override: None,
            tunnel_encap_list: Vec::new(),
        }
    }

    #[test]
    fn identical_policies_are_equal_for_locate_dedup() {
        assert_eq!(policy(), policy());
    }

    #[test]
    fn add_and_remove_peer_toggles_the_bitset() {
        let mut r = RibOut::new(1, InstanceName::new("blue"), policy());
        r.add_peer(3);
        assert!(r.has_peer(3));
        assert_eq!(r.peer_count(), 1);
        r.remove_peer(3);
        assert!(!r.has_peer(3));
        assert_eq!(r.peer_count(), 0);
    }
}
