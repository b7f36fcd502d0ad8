//! Route-target inverted index (§4.H).
//!
//! Maps each route-target community to the set of routing instances
//! that import it; the replicator (§4.E) consults this to turn "a
//! route changed in T_src" into "these T_dst tables need a secondary
//! path." Built from `InstanceManager`'s import-target lists rather
//! than a separate wire-learned RTargetTable — this build carries no
//! XMPP/route-reflector peer layer (§1 Non-goals), so there are no
//! *interested peers* to index alongside the importing tables, only
//! the table side of the pair the operation names.

use std::collections::{BTreeMap, HashSet};

use bgp_packet::ExtCommunityValue;

use crate::rib::{InstanceManager, InstanceName};

#[derive(Default)]
pub struct RTargetGroupManager {
    /// Route-target -> importing instance names. A `BTreeMap` keyed on
    /// the target's byte encoding gives a stable iteration order for
    /// the paginated query surface below.
    importers: BTreeMap<RTargetKey, HashSet<InstanceName>>,
}

/// `ExtCommunityValue` is already `Ord`, but the key used here is the
/// plain byte tuple so the manager doesn't need to special-case
/// route-target sub-types beyond what `parse_route_target` produces.
type RTargetKey = ExtCommunityValue;

impl RTargetGroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from scratch against the current instance
    /// graph. Cheap enough to call on every config change (§4.E
    /// consistency law: "a fresh pass over all primary routes using
    /// the current route-target graph" needs a fresh graph to pass
    /// over).
    pub fn rebuild(&mut self, instances: &InstanceManager) {
        self.importers.clear();
        for inst in instances.instances.values() {
            for target in &inst.import_targets {
                self.importers.entry(target.clone()).or_default().insert(inst.name.clone());
            }
        }
    }

    /// Destination tables for a route exported from `src` carrying
    /// `export_targets`: the union of every instance importing any of
    /// those targets, excluding `src` itself.
    pub fn destinations_for(&self, src: &InstanceName, export_targets: &[ExtCommunityValue]) -> HashSet<InstanceName> {
        let mut out = HashSet::new();
        for target in export_targets {
            if let Some(importers) = self.importers.get(target) {
                out.extend(importers.iter().filter(|name| *name != src).cloned());
            }
        }
        out
    }

    pub fn importers_of(&self, target: &ExtCommunityValue) -> Option<&HashSet<InstanceName>> {
        self.importers.get(target)
    }

    /// Paginated listing for operational tooling: an optional substring
    /// filter on the target's `target:ASN:NN` text form, a cursor
    /// (position in the stable key order to resume from), and a page
    /// size. Returns the page plus a cursor for the next call, or
    /// `None` once exhausted.
    pub fn query(&self, search_string: Option<&str>, cursor: Option<usize>, page_limit: usize) -> RTargetPage {
        let all: Vec<(&RTargetKey, &HashSet<InstanceName>)> = self.importers.iter().collect();
        let start = cursor.unwrap_or(0);
        let mut rtargets = Vec::new();
        let mut idx = start;
        while idx < all.len() && rtargets.len() < page_limit {
            let (key, importers) = all[idx];
            let text = format_route_target(key);
            if search_string.is_none_or(|s| text.contains(s)) {
                rtargets.push(RTargetEntry {
                    route_target: text,
                    importing_tables: importers.iter().cloned().collect(),
                });
            }
            idx += 1;
        }
        let next_cursor = if idx < all.len() { Some(idx) } else { None };
        RTargetPage { rtargets, next_cursor }
    }
}

pub struct RTargetEntry {
    pub route_target: String,
    pub importing_tables: Vec<InstanceName>,
}

pub struct RTargetPage {
    pub rtargets: Vec<RTargetEntry>,
    pub next_cursor: Option<usize>,
}

fn format_route_target(v: &ExtCommunityValue) -> String {
    let asn = u16::from_be_bytes([v.val[0], v.val[1]]);
    let local = u32::from_be_bytes([v.val[2], v.val[3], v.val[4], v.val[5]]);
    format!("target:{asn}:{local}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rib::instance::parse_route_target;

    #[test]
    fn rebuild_indexes_every_instance_import_target() {
        let mut instances = InstanceManager::new();
        instances.add(InstanceName::new("blue"), &["target:1:1".into()], &[]).unwrap();
        instances.add(InstanceName::new("pink"), &["target:1:1".into()], &[]).unwrap();

        let mut mgr = RTargetGroupManager::new();
        mgr.rebuild(&instances);

        let rt = parse_route_target("target:1:1").unwrap();
        let importers = mgr.importers_of(&rt).unwrap();
        assert_eq!(importers.len(), 2);
    }

    #[test]
    fn destinations_for_excludes_the_source_instance() {
        let mut instances = InstanceManager::new();
        instances.add(InstanceName::new("blue"), &["target:1:1".into()], &["target:1:1".into()]).unwrap();
        instances.add(InstanceName::new("pink"), &["target:1:1".into()], &[]).unwrap();

        let mut mgr = RTargetGroupManager::new();
        mgr.rebuild(&instances);

        let export = vec![parse_route_target("target:1:1").unwrap()];
        let dests = mgr.destinations_for(&InstanceName::new("blue"), &export);
        assert_eq!(dests.len(), 1);
        assert!(dests.contains(&InstanceName::new("pink")));
    }

    #[test]
    fn query_paginates_in_stable_order() {
        let mut instances = InstanceManager::new();
        for i in 0..5 {
            instances
                .add(InstanceName::new(format!("vrf{i}")), &[format!("target:1:{i}")], &[])
                .unwrap();
        }
        let mut mgr = RTargetGroupManager::new();
        mgr.rebuild(&instances);

        let page1 = mgr.query(None, None, 2);
        assert_eq!(page1.rtargets.len(), 2);
        let cursor = page1.next_cursor.expect("more pages remain");
        let page2 = mgr.query(None, Some(cursor), 2);
        assert_eq!(page2.rtargets.len(), 2);
        assert_ne!(page1.rtargets[0].route_target, page2.rtargets[0].route_target);
    }

    #[test]
    fn query_filters_by_search_string() {
        let mut instances = InstanceManager::new();
        instances.add(InstanceName::new("blue"), &["target:65000:1".into()], &[]).unwrap();
        instances.add(InstanceName::new("pink"), &["target:65001:1".into()], &[]).unwrap();
        let mut mgr = RTargetGroupManager::new();
        mgr.rebuild(&instances);

        let page = mgr.query(Some("65001"), None, 10);
        assert_eq!(page.rtargets.len(), 1);
        assert_eq!(page.rtargets[0].route_target, "target:65001:1");
    }
}
