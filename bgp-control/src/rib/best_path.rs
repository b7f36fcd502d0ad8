//! Best-path selection (§4.D): the ordered tiebreak chain that picks
//! exactly one path per route.
//!
//! Grounded on the teacher's `BgpLocalRib::compare_routes`, generalized
//! from a `BgpRoute`'s flat fields to the attribute-DB-backed `Path`
//! plus the ordered list used by multi-path tables, and with the
//! teacher's Cisco-specific "weight" step dropped (not part of this
//! spec) while the rest of the RFC 4271 chain is kept in the same
//! order.

use std::cmp::Ordering;

use bgp_packet::Origin;

use crate::rib::path::Path;

/// Returns `Less` if `a` should lose to `b`, `Greater` if `a` wins,
/// `Equal` only when every tiebreak is exhausted (shouldn't happen
/// between two distinct paths once tiebreak 7, path-id, runs, but a
/// caller comparing a path to itself will see it).
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    // 1. Higher local-pref wins. eBGP paths default to 100 the same way
    //    iBGP paths do when unset, per the teacher's fallback.
    let lp_a = a.attr.local_pref.as_ref().map(|l| l.local_pref).unwrap_or(100);
    let lp_b = b.attr.local_pref.as_ref().map(|l| l.local_pref).unwrap_or(100);
    if lp_a != lp_b {
        return lp_a.cmp(&lp_b);
    }

    // 2. Shorter AS-path wins.
    let len_a = a.attr.aspath.as_ref().map(|p| p.length()).unwrap_or(0);
    let len_b = b.attr.aspath.as_ref().map(|p| p.length()).unwrap_or(0);
    if len_a != len_b {
        return len_b.cmp(&len_a);
    }

    // 3. Lower origin wins (IGP < EGP < INCOMPLETE).
    let origin_a = a.attr.origin.unwrap_or_default();
    let origin_b = b.attr.origin.unwrap_or_default();
    if origin_a != origin_b {
        return origin_rank(origin_b).cmp(&origin_rank(origin_a));
    }

    // 4. Lower MED wins, only among paths with the same neighbor-AS.
    if a.source.peer_as().is_some() && a.source.peer_as() == b.source.peer_as() {
        let med_a = a.attr.med.as_ref().map(|m| m.med).unwrap_or(0);
        let med_b = b.attr.med.as_ref().map(|m| m.med).unwrap_or(0);
        if med_a != med_b {
            return med_b.cmp(&med_a);
        }
    }

    // 5. eBGP preferred over iBGP.
    if a.source.is_ebgp() != b.source.is_ebgp() {
        return a.source.is_ebgp().cmp(&b.source.is_ebgp());
    }

    // 6. Lower router-id wins.
    if let (Some(rid_a), Some(rid_b)) = (a.source.router_id(), b.source.router_id())
        && rid_a != rid_b
    {
        return u32::from(rid_b).cmp(&u32::from(rid_a));
    }

    // 7. Lower path-id wins.
    b.source.path_id().cmp(&a.source.path_id())
}

fn origin_rank(o: Origin) -> u8 {
    match o {
        Origin::Igp => 0,
        Origin::Egp => 1,
        Origin::Incomplete => 2,
    }
}

/// Scans an ordered path list and returns the index of the best path,
/// or `None` if every path is deleted/invalid. `None` among otherwise
/// candidate paths correctly excludes withdrawn paths from
/// consideration (§8: "a route with no valid attribute ... is not
/// Valid even with a path present").
pub fn select_best(paths: &[Path], prefix: &bgp_packet::Prefix) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, path) in paths.iter().enumerate() {
        if !path.is_valid(prefix) {
            continue;
        }
        best = match best {
            None => Some(idx),
            Some(best_idx) => {
                if compare_paths(path, &paths[best_idx]) == Ordering::Greater {
                    Some(idx)
                } else {
                    Some(best_idx)
                }
            }
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_db::{AttrDb, BgpAttrSpec};
    use crate::rib::path::PathSource;
    use bgp_packet::{InetPrefix, LocalPref, Prefix};
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    fn inet() -> Prefix {
        Prefix::Inet(InetPrefix::from_str("10.0.0.0/24").unwrap())
    }

    fn peer_path(db: &AttrDb, local_pref: u32, router_id: u8) -> Path {
        let attr = db.locate(BgpAttrSpec {
            local_pref: Some(LocalPref { local_pref }),
            ..Default::default()
        });
        Path::new(
            attr,
            None,
            PathSource::Peer {
                peer_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, router_id)),
                peer_as: 65000,
                router_id: Ipv4Addr::new(1, 1, 1, router_id),
                ebgp: false,
                path_id: 0,
            },
        )
    }

    #[test]
    fn higher_local_pref_wins() {
        let db = AttrDb::new();
        let low = peer_path(&db, 50, 1);
        let high = peer_path(&db, 200, 2);
        let best = select_best(&[low, high], &inet()).unwrap();
        assert_eq!(best, 1);
    }

    #[test]
    fn lower_router_id_breaks_full_tie() {
        let db = AttrDb::new();
        let a = peer_path(&db, 100, 9);
        let b = peer_path(&db, 100, 3);
        let best = select_best(&[a, b], &inet()).unwrap();
        assert_eq!(best, 1);
    }

    #[test]
    fn all_deleted_selects_none() {
        let db = AttrDb::new();
        let mut p = peer_path(&db, 100, 1);
        p.deleted = true;
        assert_eq!(select_best(&[p], &inet()), None);
    }

    #[test]
    fn ermvpn_native_route_without_label_is_never_valid() {
        use crate::attr_db::BgpAttrSpec;
        use bgp_packet::{ErmVpnPrefix, RouteDistinguisher};

        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec::default());
        let path = Path::new(
            attr,
            None,
            PathSource::Peer {
                peer_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                peer_as: 65000,
                router_id: Ipv4Addr::new(1, 1, 1, 1),
                ebgp: false,
                path_id: 0,
            },
        );
        let ermvpn = Prefix::ErmVpn(ErmVpnPrefix {
            route_type: 3,
            rd: RouteDistinguisher::asn(1, 1),
            router_id: Ipv4Addr::new(10, 0, 0, 1),
            group: IpAddr::V4(Ipv4Addr::new(239, 1, 1, 1)),
            source: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        });
        assert_eq!(select_best(&[path], &ermvpn), None, "no label-block: never valid");
    }
}
