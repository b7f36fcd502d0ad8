//! A destination within a table: a prefix plus its ordered path list
//! and the currently-selected best path (§3 Route, §4.D Route
//! operations).

use bgp_packet::Prefix;

use crate::rib::best_path::select_best;
use crate::rib::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// No paths yet; exists only because a listener attached state
    /// before any path arrived.
    Fresh,
    /// At least one non-deleted path.
    Live,
    /// Last path gone; kept one notification epoch so listeners observe
    /// the withdrawal before the route is reaped.
    MarkedForDelete,
    Gone,
}

pub struct Route {
    pub prefix: Prefix,
    pub paths: Vec<Path>,
    pub best: Option<usize>,
    pub state: RouteState,
    /// Opaque per-listener bookkeeping slots; a route is not reaped
    /// while any entry here is non-empty (§4.D Listeners).
    pub listener_state: Vec<u64>,
}

impl Route {
    pub fn new(prefix: Prefix) -> Self {
        Route {
            prefix,
            paths: Vec::new(),
            best: None,
            state: RouteState::Fresh,
            listener_state: Vec::new(),
        }
    }

    /// `InsertPath`: appends or replaces the path from the same source,
    /// then recomputes best-path. Returns whether the best path's
    /// *content* changed — source, attribute set, or label — so the
    /// table only notifies listeners once per prefix per epoch, but
    /// still notifies when the same peer re-advertises the same prefix
    /// with new attributes that remain best.
    pub fn insert_path(&mut self, path: Path) -> bool {
        let old_best = self.best_path().cloned();
        if let Some(existing) = self
            .paths
            .iter_mut()
            .find(|p| same_source(&p.source, &path.source))
        {
            *existing = path;
        } else {
            self.paths.push(path);
        }
        self.state = RouteState::Live;
        self.recompute_best(old_best)
    }

    /// `DeletePath`: dup-delete is a no-op (§8 RIB properties).
    pub fn delete_path(&mut self, source: &crate::rib::path::PathSource) -> bool {
        let old_best = self.best_path().cloned();
        let before = self.paths.len();
        self.paths.retain(|p| !same_source(&p.source, source));
        if self.paths.len() == before {
            return false; // no-op: nothing matched
        }
        if self.paths.is_empty() {
            self.state = RouteState::MarkedForDelete;
        }
        self.recompute_best(old_best)
    }

    pub fn best_path(&self) -> Option<&Path> {
        self.best.map(|idx| &self.paths[idx])
    }

    fn recompute_best(&mut self, old_best: Option<Path>) -> bool {
        let new_best = select_best(&self.paths, &self.prefix);
        self.best = new_best;
        let new_best = self.best_path();
        match (old_best, new_best) {
            (None, None) => false,
            (Some(old), Some(new)) => {
                !same_source(&old.source, &new.source) || old.attr != new.attr || old.label != new.label
            }
            _ => true,
        }
    }

    /// A route is reapable once it has no live paths and no listener
    /// has state attached (§3 Tables/Routes lifecycle).
    pub fn is_reapable(&self) -> bool {
        self.state == RouteState::MarkedForDelete
            && self.paths.is_empty()
            && self.listener_state.iter().all(|s| *s == 0)
    }
}

fn same_source(
    a: &crate::rib::path::PathSource,
    b: &crate::rib::path::PathSource,
) -> bool {
    use crate::rib::path::PathSource::*;
    match (a, b) {
        (Peer { peer_addr: pa, path_id: ia, .. }, Peer { peer_addr: pb, path_id: ib, .. }) => {
            pa == pb && ia == ib
        }
        (Replicated { source_table: ta, source_prefix: sa, .. },
         Replicated { source_table: tb, source_prefix: sb, .. }) => ta == tb && sa == sb,
        (Local, Local) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_db::{AttrDb, BgpAttrSpec};
    use crate::rib::path::PathSource;
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    fn prefix() -> Prefix {
        Prefix::Inet(bgp_packet::InetPrefix::from_str("10.0.0.0/24").unwrap())
    }

    fn peer_path(db: &AttrDb, peer: u8) -> Path {
        let attr = db.locate(BgpAttrSpec::default());
        Path::new(
            attr,
            None,
            PathSource::Peer {
                peer_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, peer)),
                peer_as: 65000,
                router_id: Ipv4Addr::new(1, 1, 1, peer),
                ebgp: false,
                path_id: 0,
            },
        )
    }

    #[test]
    fn dup_delete_is_a_no_op() {
        let db = AttrDb::new();
        let mut route = Route::new(prefix());
        let path = peer_path(&db, 1);
        route.insert_path(path.clone());
        let source = path.source.clone();

        assert!(route.delete_path(&source));
        assert!(!route.delete_path(&source), "second delete must be a no-op");
        assert_eq!(route.state, RouteState::MarkedForDelete);
    }

    #[test]
    fn best_path_notifies_once_per_epoch() {
        let db = AttrDb::new();
        let mut route = Route::new(prefix());
        assert!(route.insert_path(peer_path(&db, 1)));
        // Same single path re-announced unchanged: best pointer doesn't move.
        assert!(!route.insert_path(peer_path(&db, 1)));
    }

    #[test]
    fn same_source_new_attributes_still_notifies() {
        let db = AttrDb::new();
        let mut route = Route::new(prefix());
        assert!(route.insert_path(peer_path(&db, 1)));

        // Same peer re-advertises the same prefix with a different
        // attribute set; the best path index doesn't move, but its
        // content did, so this must still report a change.
        let mut spec = BgpAttrSpec::default();
        spec.med = Some(bgp_packet::Med::new(100));
        let attr = db.locate(spec);
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
        assert!(route.insert_path(path), "attribute-only change on the same best path must notify");
    }
}
