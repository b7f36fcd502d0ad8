//! SchedulingGroup: the set of RibOuts and peers that must be drained
//! together, plus the merge/split bookkeeping that keeps that set
//! minimal (§4.F).

use std::collections::{HashMap, HashSet};

use crate::rib::instance::InstanceName;

use super::ribout::{PeerId, RibOut, RibOutId, RibOutPolicy};
use super::workqueue::WorkQueue;

pub type GroupId = u64;

/// Above this many peers, a group's connectivity graph is expensive
/// enough to recompute that repeated splits would cost more than the
/// wasted fan-out of staying merged; larger deployments just stay
/// merged once they cross it (the "split-disabled" optimization).
pub const SPLIT_THRESHOLD: usize = 64;

pub struct SchedulingGroup {
    pub id: GroupId,
    pub ribouts: HashSet<RibOutId>,
    pub peers: HashSet<PeerId>,
    pub queue: WorkQueue,
    pub split_disabled: bool,
}

impl SchedulingGroup {
    fn new(id: GroupId) -> Self {
        SchedulingGroup {
            id,
            ribouts: HashSet::new(),
            peers: HashSet::new(),
            queue: WorkQueue::new(),
            split_disabled: false,
        }
    }
}

/// Owns every `RibOut` and the groups they're partitioned into.
/// Registration/unregistration is meant to run on the single
/// `PeerMembership` task (§4.F concurrency); nothing here is
/// internally synchronized.
#[derive(Default)]
pub struct SchedulingGroupManager {
    ribout_by_key: HashMap<(InstanceName, RibOutPolicy), RibOutId>,
    ribouts: HashMap<RibOutId, RibOut>,
    ribout_group: HashMap<RibOutId, GroupId>,
    groups: HashMap<GroupId, SchedulingGroup>,
    next_ribout_id: RibOutId,
    next_group_id: GroupId,
}

impl SchedulingGroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Locate`: identical (table, policy) always returns the same
    /// RibOut.
    pub fn locate_ribout(&mut self, table: InstanceName, policy: RibOutPolicy) -> RibOutId {
        let key = (table.clone(), policy.clone());
        if let Some(&id) = self.ribout_by_key.get(&key) {
            return id;
        }
        let id = self.next_ribout_id;
        self.next_ribout_id += 1;
        self.ribouts.insert(id, RibOut::new(id, table, policy));
        self.ribout_by_key.insert(key, id);
        id
    }

    pub fn ribout(&self, id: RibOutId) -> Option<&RibOut> {
        self.ribouts.get(&id)
    }

    pub fn group_of_ribout(&self, id: RibOutId) -> Option<GroupId> {
        self.ribout_group.get(&id).copied()
    }

    pub fn ribouts_for_peer(&self, peer: PeerId) -> Vec<RibOutId> {
        self.ribouts.values().filter(|r| r.has_peer(peer)).map(|r| r.id).collect()
    }

    pub fn group(&self, id: GroupId) -> Option<&SchedulingGroup> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut SchedulingGroup> {
        self.groups.get_mut(&id)
    }

    /// Attaches `peer` to `ribout`, merging groups as needed so the
    /// invariant "every pair of RibOuts sharing a peer sits in the
    /// same group" keeps holding.
    pub fn register(&mut self, peer: PeerId, ribout_id: RibOutId) {
        self.ribouts.get_mut(&ribout_id).expect("unknown ribout").add_peer(peer);

        let mut touched: Vec<GroupId> = self
            .groups
            .values()
            .filter(|g| g.peers.contains(&peer))
            .map(|g| g.id)
            .collect();
        if let Some(existing) = self.ribout_group.get(&ribout_id) {
            touched.push(*existing);
        }
        touched.sort_unstable();
        touched.dedup();

        let group_id = if touched.is_empty() {
            let id = self.next_group_id;
            self.next_group_id += 1;
            self.groups.insert(id, SchedulingGroup::new(id));
            id
        } else {
            self.merge_groups(&touched)
        };

        let group = self.groups.get_mut(&group_id).unwrap();
        group.ribouts.insert(ribout_id);
        group.peers.insert(peer);
        self.ribout_group.insert(ribout_id, group_id);
    }

    /// Merges every group in `ids` into the lowest-numbered one,
    /// moving its work queue items across unchanged (they're already
    /// valid for the merged group since it's a superset).
    fn merge_groups(&mut self, ids: &[GroupId]) -> GroupId {
        let target = *ids.iter().min().unwrap();
        for &id in ids {
            if id == target {
                continue;
            }
            let Some(mut other) = self.groups.remove(&id) else { continue };
            for r in other.ribouts.drain() {
                self.ribout_group.insert(r, target);
            }
            let mut moved = other.queue.drain_valid_into(|_| true);
            let target_group = self.groups.get_mut(&target).unwrap();
            target_group.peers.extend(other.peers.drain());
            target_group.split_disabled |= other.split_disabled;
            while let Some(item) = moved.pop() {
                target_group.queue.push(item);
            }
        }
        // Rebuild the merged group's ribout set from the authoritative
        // ribout_group index rather than trying to thread queues
        // through the removed groups above.
        let ribouts: HashSet<RibOutId> = self
            .ribout_group
            .iter()
            .filter(|(_, g)| **g == target)
            .map(|(r, _)| *r)
            .collect();
        self.groups.get_mut(&target).unwrap().ribouts = ribouts;
        target
    }

    /// Detaches `peer` from `ribout`, and, unless splitting has been
    /// disabled for this group or it's grown past the threshold,
    /// checks whether the group's RibOuts are still all
    /// peer-connected; if not, splits it into its connected
    /// components.
    pub fn unregister(&mut self, peer: PeerId, ribout_id: RibOutId) {
        self.ribouts.get_mut(&ribout_id).expect("unknown ribout").remove_peer(peer);

        let Some(group_id) = self.ribout_group.get(&ribout_id).copied() else { return };

        // Peer may still be attached to other RibOuts in the group.
        let peer_elsewhere = self
            .group(group_id)
            .map(|g| g.ribouts.iter().any(|r| self.ribouts[r].has_peer(peer)))
            .unwrap_or(false);
        if !peer_elsewhere {
            self.groups.get_mut(&group_id).unwrap().peers.remove(&peer);
        }

        let group = self.groups.get_mut(&group_id).unwrap();
        if group.split_disabled {
            return;
        }
        if group.peers.len() >= SPLIT_THRESHOLD {
            group.split_disabled = true;
            return;
        }

        self.maybe_split(group_id);
    }

    fn maybe_split(&mut self, group_id: GroupId) {
        let ribout_ids: HashSet<RibOutId> = self.groups[&group_id].ribouts.clone();
        if ribout_ids.len() <= 1 {
            return;
        }
        let components = connected_components(&ribout_ids, &self.ribouts);
        if components.len() <= 1 {
            return;
        }

        let mut group = self.groups.remove(&group_id).unwrap();
        for component in components {
            let new_id = self.next_group_id;
            self.next_group_id += 1;
            let mut new_group = SchedulingGroup::new(new_id);
            for &r in &component {
                self.ribout_group.insert(r, new_id);
                new_group.peers.extend(self.ribouts[&r].peers());
            }
            new_group.ribouts = component.clone();
            new_group.queue = group.queue.drain_valid_into(|kind| match kind {
                super::workqueue::WorkItemKind::RibOut { ribout, .. } => component.contains(ribout),
                super::workqueue::WorkItemKind::Peer { peer } => new_group.peers.contains(peer),
            });
            self.groups.insert(new_id, new_group);
        }
    }
}

fn connected_components(ribout_ids: &HashSet<RibOutId>, ribouts: &HashMap<RibOutId, RibOut>) -> Vec<HashSet<RibOutId>> {
    let mut visited = HashSet::new();
    let mut components = Vec::new();
    for &start in ribout_ids {
        if visited.contains(&start) {
            continue;
        }
        let mut component = HashSet::new();
        let mut stack = vec![start];
        while let Some(r) = stack.pop() {
            if !visited.insert(r) {
                continue;
            }
            component.insert(r);
            let peers: HashSet<PeerId> = ribouts[&r].peers().collect();
            for &other in ribout_ids {
                if !visited.contains(&other) && ribouts[&other].peers().any(|p| peers.contains(&p)) {
                    stack.push(other);
                }
            }
        }
        components.push(component);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ribout::{Encoding, SessionType};

    fn policy(as_number: u32) -> RibOutPolicy {
        RibOutPolicy {
            encoding: Encoding::Bgp,
            session_type: SessionType::EBgp,
            as_number,
            as_override: false,
            llgr_enabled: false,
            ipv6_address_family: false,
            cluster_id: 0,
            nexthop_override: None,
            tunnel_encap_list: Vec::new(),
        }
    }

    #[test]
    fn locate_dedups_identical_table_and_policy() {
        let mut mgr = SchedulingGroupManager::new();
        let a = mgr.locate_ribout(InstanceName::new("blue"), policy(1));
        let b = mgr.locate_ribout(InstanceName::new("blue"), policy(1));
        assert_eq!(a, b);
        let c = mgr.locate_ribout(InstanceName::new("blue"), policy(2));
        assert_ne!(a, c);
    }

    #[test]
    fn shared_peer_merges_two_ribouts_into_one_group() {
        let mut mgr = SchedulingGroupManager::new();
        let r1 = mgr.locate_ribout(InstanceName::new("blue"), policy(1));
        let r2 = mgr.locate_ribout(InstanceName::new("pink"), policy(2));

        mgr.register(100, r1);
        mgr.register(100, r2);

        assert_eq!(mgr.group_of_ribout(r1), mgr.group_of_ribout(r2));
    }

    #[test]
    fn removing_the_shared_peer_splits_the_group() {
        let mut mgr = SchedulingGroupManager::new();
        let r1 = mgr.locate_ribout(InstanceName::new("blue"), policy(1));
        let r2 = mgr.locate_ribout(InstanceName::new("pink"), policy(2));

        mgr.register(100, r1);
        mgr.register(100, r2);
        mgr.register(200, r2);

        mgr.unregister(100, r1);

        assert_ne!(mgr.group_of_ribout(r1), mgr.group_of_ribout(r2));
    }

    #[test]
    fn split_disabled_once_group_crosses_threshold() {
        let mut mgr = SchedulingGroupManager::new();
        let r1 = mgr.locate_ribout(InstanceName::new("blue"), policy(1));
        let r2 = mgr.locate_ribout(InstanceName::new("pink"), policy(2));
        for peer in 0..SPLIT_THRESHOLD as PeerId {
            mgr.register(peer, r1);
        }
        mgr.register(0, r2);
        let group_id = mgr.group_of_ribout(r1).unwrap();
        assert!(mgr.group(group_id).unwrap().split_disabled);

        mgr.unregister(0, r2);
        assert_eq!(mgr.group_of_ribout(r1), mgr.group_of_ribout(r2));
    }
}
