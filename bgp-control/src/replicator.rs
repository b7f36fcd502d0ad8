//! Route replicator (§4.E): leaks each VRF's best-path routes into
//! every other VRF that imports one of its export route-targets.
//!
//! Grounded on the table/path model in `rib`, this is not its own
//! task class — it runs synchronously inside whatever calls
//! `on_route_changed`, mirroring the way the teacher's RIB listeners
//! are plain callbacks invoked from the table's own drain loop rather
//! than a separate scheduled task. `server` wires a `Table` listener
//! receiver into repeated calls to `on_route_changed`.

use std::collections::{HashMap, HashSet};

use bgp_packet::{AfiSafi, Prefix};

use crate::attr_db::AttrDb;
use crate::rib::{InstanceManager, InstanceName};
use crate::rtarget::RTargetGroupManager;

/// Key identifying one leaked-route's installed secondary paths:
/// the source instance, family, and prefix it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LeakKey {
    source: InstanceName,
    family: AfiSafi,
    prefix: Prefix,
}

/// Tracks, per leaked route, which destination instances currently
/// carry a secondary path for it — the "per-(T_src, R) set of
/// installed entries" the replicator needs to compute deltas and stay
/// idempotent across repeated notifications for an unchanged route.
#[derive(Default)]
pub struct Replicator {
    installed: HashMap<LeakKey, HashSet<InstanceName>>,
}

impl Replicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reacts to a best-path change for `prefix` in `source`'s table
    /// for `family`. Computes the current destination set via the
    /// route-target graph, diffs it against what's currently
    /// installed, and applies only the delta — so a repeated
    /// notification for an unchanged route (same destinations, same
    /// attribute) is a no-op (§4.E idempotence law).
    pub fn on_route_changed(
        &mut self,
        instances: &mut InstanceManager,
        rtargets: &RTargetGroupManager,
        attr_db: &AttrDb,
        source: &InstanceName,
        family: AfiSafi,
        prefix: &Prefix,
    ) {
        let key = LeakKey { source: source.clone(), family, prefix: prefix.clone() };

        let export_targets = match instances.get(source) {
            Some(inst) => inst.export_targets.clone(),
            None => {
                self.withdraw_all(instances, &key);
                return;
            }
        };

        let best = instances
            .get_mut(source)
            .and_then(|inst| inst.tables.get_mut(&family))
            .and_then(|table| table.with_route(prefix, |route| route.and_then(|r| r.best_path().cloned())));

        let Some(best) = best else {
            self.withdraw_all(instances, &key);
            return;
        };

        let wanted = rtargets.destinations_for(source, &export_targets);
        let previously_installed = self.installed.entry(key.clone()).or_default().clone();

        for gone in previously_installed.difference(&wanted) {
            withdraw_secondary(instances, gone, family, prefix, source);
        }

        for dest in &wanted {
            install_secondary(instances, dest, family, prefix, &best, source, &export_targets, attr_db);
        }

        if wanted.is_empty() {
            self.installed.remove(&key);
        } else {
            self.installed.insert(key, wanted);
        }
    }

    fn withdraw_all(&mut self, instances: &mut InstanceManager, key: &LeakKey) {
        if let Some(dests) = self.installed.remove(key) {
            for dest in dests {
                withdraw_secondary(instances, &dest, key.family, &key.prefix, &key.source);
            }
        }
    }
}

fn install_secondary(
    instances: &mut InstanceManager,
    dest: &InstanceName,
    family: AfiSafi,
    prefix: &Prefix,
    best: &crate::rib::Path,
    source: &InstanceName,
    source_export_targets: &[bgp_packet::ExtCommunityValue],
    attr_db: &AttrDb,
) {
    let Some(dest_inst) = instances.get(dest) else { return };
    let dest_export_targets = dest_inst.export_targets.clone();

    let mut ext = best
        .attr
        .ext_community
        .as_ref()
        .map(|h| (*h).clone())
        .unwrap_or_else(|| bgp_packet::ExtCommunity::new());
    for t in dest_export_targets.iter().chain(source_export_targets.iter()) {
        ext.push(t.clone());
    }
    let ext_handle = attr_db.locate_ext_community(ext);
    let attr = attr_db.replace_ext_community_and_locate(&best.attr, ext_handle);

    let secondary = crate::rib::Path::new(
        attr,
        best.label,
        crate::rib::PathSource::Replicated {
            source_table: source.clone(),
            source_prefix: Box::new(prefix.clone()),
            peer_as: best.source.peer_as().unwrap_or(0),
            router_id: best.source.router_id().unwrap_or(std::net::Ipv4Addr::UNSPECIFIED),
            ebgp: best.source.is_ebgp(),
        },
    );

    let table = instances.get_mut(dest).unwrap().table(family);
    table.enqueue(crate::rib::table::TableRequest::AddChange { prefix: prefix.clone(), path: secondary });
}

fn withdraw_secondary(instances: &mut InstanceManager, dest: &InstanceName, family: AfiSafi, prefix: &Prefix, source: &InstanceName) {
    let Some(dest_inst) = instances.get_mut(dest) else { return };
    let Some(table) = dest_inst.tables.get_mut(&family) else { return };
    table.enqueue(crate::rib::table::TableRequest::Delete {
        prefix: prefix.clone(),
        source: crate::rib::PathSource::Replicated {
            source_table: source.clone(),
            source_prefix: Box::new(prefix.clone()),
            peer_as: 0,
            router_id: std::net::Ipv4Addr::UNSPECIFIED,
            ebgp: false,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_db::BgpAttrSpec;
    use crate::rib::instance::parse_route_target;
    use crate::rib::table::TableRequest;
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    fn family() -> AfiSafi {
        AfiSafi::new(bgp_packet::Afi::Ip, bgp_packet::Safi::MplsVpn)
    }

    fn prefix() -> Prefix {
        Prefix::Inet(bgp_packet::InetPrefix::from_str("10.0.0.0/24").unwrap())
    }

    fn peer_path(db: &AttrDb) -> crate::rib::Path {
        let attr = db.locate(BgpAttrSpec::default());
        crate::rib::Path::new(
            attr,
            None,
            crate::rib::PathSource::Peer {
                peer_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                peer_as: 65000,
                router_id: Ipv4Addr::new(1, 1, 1, 1),
                ebgp: true,
                path_id: 0,
            },
        )
    }

    #[test]
    fn best_path_change_installs_into_every_importer() {
        let db = AttrDb::new();
        let mut instances = InstanceManager::new();
        instances.add(InstanceName::new("blue"), &[], &["target:1:1".into()]).unwrap();
        instances.add(InstanceName::new("pink"), &["target:1:1".into()], &[]).unwrap();

        let mut rtargets = RTargetGroupManager::new();
        rtargets.rebuild(&instances);

        instances
            .get_mut(&InstanceName::new("blue"))
            .unwrap()
            .table(family())
            .enqueue(TableRequest::AddChange { prefix: prefix(), path: peer_path(&db) });

        let mut replicator = Replicator::new();
        replicator.on_route_changed(&mut instances, &rtargets, &db, &InstanceName::new("blue"), family(), &prefix());

        let pink_has_route = instances
            .get(&InstanceName::new("pink"))
            .unwrap()
            .tables
            .get(&family())
            .map(|t| t.route_count())
            .unwrap_or(0);
        assert_eq!(pink_has_route, 1);
    }

    #[test]
    fn repeated_notification_for_unchanged_route_is_idempotent() {
        let db = AttrDb::new();
        let mut instances = InstanceManager::new();
        instances.add(InstanceName::new("blue"), &[], &["target:1:1".into()]).unwrap();
        instances.add(InstanceName::new("pink"), &["target:1:1".into()], &[]).unwrap();
        let mut rtargets = RTargetGroupManager::new();
        rtargets.rebuild(&instances);

        instances
            .get_mut(&InstanceName::new("blue"))
            .unwrap()
            .table(family())
            .enqueue(TableRequest::AddChange { prefix: prefix(), path: peer_path(&db) });

        let mut replicator = Replicator::new();
        replicator.on_route_changed(&mut instances, &rtargets, &db, &InstanceName::new("blue"), family(), &prefix());
        let first_count = instances.get(&InstanceName::new("pink")).unwrap().tables.get(&family()).unwrap().route_count();

        replicator.on_route_changed(&mut instances, &rtargets, &db, &InstanceName::new("blue"), family(), &prefix());
        let second_count = instances.get(&InstanceName::new("pink")).unwrap().tables.get(&family()).unwrap().route_count();

        assert_eq!(first_count, second_count);
    }

    #[test]
    fn bad_route_target_parses_cleanly_for_test_setup() {
        assert!(parse_route_target("target:1:1").is_ok());
    }
}
