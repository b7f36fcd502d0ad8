//! A single contributed path for a route.
//!
//! Grounded on the teacher's `bgp::route::BgpRoute`, which bundles a
//! peer identity with a parsed attribute set per prefix; here the
//! attribute set is an interned `Handle<BgpAttrSpec>` instead of an
//! owned `Vec<Attr>`, and peer/secondary-source identity is split out
//! into `PathSource` so a `Path` stays `Clone`-cheap (one pointer bump
//! for the attribute, the rest are small Copy fields).

use std::net::{IpAddr, Ipv4Addr};

use bgp_packet::Label;

use crate::attr_db::{BgpAttrSpec, Handle};
use crate::rib::instance::InstanceName;
use bgp_packet::Prefix;

/// Where a path came from. `Peer` paths are primary; `Replicated` paths
/// are installed by the route replicator (§4.E) and additionally carry
/// enough to undo the replication atomically when the primary goes
/// away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSource {
    Peer {
        peer_addr: IpAddr,
        peer_as: u32,
        router_id: Ipv4Addr,
        ebgp: bool,
        path_id: u32,
    },
    Replicated {
        source_table: InstanceName,
        source_prefix: Box<Prefix>,
        peer_as: u32,
        router_id: Ipv4Addr,
        ebgp: bool,
    },
    /// A handful of self-originated discovery routes (§1 Non-goals: the
    /// core does not originate routes locally beyond this).
    Local,
}

impl PathSource {
    pub fn peer_as(&self) -> Option<u32> {
        match self {
            PathSource::Peer { peer_as, .. } => Some(*peer_as),
            PathSource::Replicated { peer_as, .. } => Some(*peer_as),
            PathSource::Local => None,
        }
    }

    pub fn router_id(&self) -> Option<Ipv4Addr> {
        match self {
            PathSource::Peer { router_id, .. } => Some(*router_id),
            PathSource::Replicated { router_id, .. } => Some(*router_id),
            PathSource::Local => None,
        }
    }

    pub fn is_ebgp(&self) -> bool {
        matches!(
            self,
            PathSource::Peer { ebgp: true, .. } | PathSource::Replicated { ebgp: true, .. }
        )
    }

    pub fn path_id(&self) -> u32 {
        match self {
            PathSource::Peer { path_id, .. } => *path_id,
            _ => 0,
        }
    }
}

#[derive(Clone)]
pub struct Path {
    pub attr: Handle<BgpAttrSpec>,
    pub label: Option<Label>,
    pub source: PathSource,
    /// Marks a path that is logically withdrawn but still present for
    /// one notification epoch so listeners can observe the deletion
    /// (§3 Route lifecycle).
    pub deleted: bool,
}

impl Path {
    pub fn new(attr: Handle<BgpAttrSpec>, label: Option<Label>, source: PathSource) -> Self {
        Path {
            attr,
            label,
            source,
            deleted: false,
        }
    }

    /// A path is Valid only if it carries the attributes required for
    /// its family to be forwardable — e.g. an ErmVPN native prefix with
    /// no label-block is never valid even though a path object exists
    /// for it (§8 RIB properties).
    pub fn is_valid(&self, prefix: &Prefix) -> bool {
        if self.deleted {
            return false;
        }
        if matches!(prefix, Prefix::ErmVpn(_)) && self.label.is_none() {
            return false;
        }
        true
    }
}
