//! PeerMembership (§4.G): the single-threaded task that is the only
//! writer of RibOut/SchedulingGroup membership (§5 concurrency model).
//!
//! Modeled here as a plain synchronous type rather than a task that
//! owns an mpsc loop itself — `server` is the one that spawns a
//! `Task<()>` around a channel and calls these methods from inside it,
//! the same way `rib::table::Table::spawn_partitions` wraps
//! `Partition::apply`. Keeping the mutation logic synchronous is what
//! let every test below run without a Tokio runtime.

use super::group::SchedulingGroupManager;
use super::ribout::{PeerId, RibOutId, RibOutPolicy};
use super::workqueue::{QueueId, WorkItemKind};
use crate::rib::instance::InstanceName;

#[derive(Default)]
pub struct PeerMembership {
    pub groups: SchedulingGroupManager,
}

impl PeerMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locates or creates the RibOut for `(table, policy)`, attaches
    /// `peer`, merging groups as needed, and schedules the RibOut's
    /// bulk queue for draining so the new peer gets an initial sync.
    pub fn register(&mut self, peer: PeerId, table: InstanceName, policy: RibOutPolicy) -> RibOutId {
        let ribout = self.groups.locate_ribout(table, policy);
        self.groups.register(peer, ribout);

        let group_id = self.groups.group_of_ribout(ribout).expect("just registered");
        self.groups
            .group_mut(group_id)
            .unwrap()
            .queue
            .push(WorkItemKind::RibOut { ribout, queue_id: QueueId::Bulk });
        ribout
    }

    /// Detaches `peer` from the RibOut for `(table, policy)` if one
    /// exists, invalidating any queued work for it and letting the
    /// group manager decide whether to split.
    pub fn unregister(&mut self, peer: PeerId, table: InstanceName, policy: RibOutPolicy) {
        let ribout = self.groups.locate_ribout(table, policy);
        if let Some(group_id) = self.groups.group_of_ribout(ribout)
            && let Some(group) = self.groups.group_mut(group_id)
        {
            group.queue.invalidate_peer(peer);
        }
        self.groups.unregister(peer, ribout);
    }

    /// A previously send-blocked peer became ready again: enqueue a
    /// `WorkPeer` item on every group the peer currently belongs to so
    /// its pending per-peer markers get replayed.
    pub fn send_ready(&mut self, peer: PeerId) {
        let mut group_ids: Vec<_> = self
            .groups
            .ribouts_for_peer(peer)
            .into_iter()
            .filter_map(|r| self.groups.group_of_ribout(r))
            .collect();
        group_ids.sort_unstable();
        group_ids.dedup();
        for group_id in group_ids {
            if let Some(group) = self.groups.group_mut(group_id) {
                group.queue.push(WorkItemKind::Peer { peer });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ribout::{Encoding, SessionType};

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
    fn register_schedules_a_bulk_sync_item() {
        let mut membership = PeerMembership::new();
        let ribout = membership.register(1, InstanceName::new("blue"), policy());
        let group_id = membership.groups.group_of_ribout(ribout).unwrap();
        let group = membership.groups.group_mut(group_id).unwrap();
        assert_eq!(
            group.queue.pop(),
            Some(WorkItemKind::RibOut { ribout, queue_id: QueueId::Bulk })
        );
    }

    #[test]
    fn unregister_invalidates_the_peers_queued_work() {
        let mut membership = PeerMembership::new();
        membership.register(1, InstanceName::new("blue"), policy());
        membership.unregister(1, InstanceName::new("blue"), policy());
        let ribout = membership.groups.locate_ribout(InstanceName::new("blue"), policy());
        assert!(!membership.groups.ribout(ribout).unwrap().has_peer(1));
    }
}
