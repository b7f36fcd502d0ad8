//! The `BgpAttr` interning database and the canonical attribute spec it
//! stores.
//!
//! Grounded on `bgp-packet`'s `bgp_attr::BgpAttr` (same field set, same
//! sub-attribute types) but with the sub-objects that the spec calls out
//! for separate interning — AS-path, community, ext-community — stored
//! as `Handle<T>` instead of owned values, so two `BgpAttrSpec`s that
//! differ only in, say, next-hop still share the same canonical AS-path
//! object.

use bgp_packet::{
    Aggregator, Aigp, As4Path, AtomicAggregate, BgpNexthop, ClusterList, Community, ExtCommunity,
    LargeCommunity, LocalPref, Med, Origin, OriginatorId, PmsiTunnel, RouteDistinguisher,
};

use super::interner::{Handle, Interner};

/// An optional attribute this build of the codec doesn't recognize,
/// preserved verbatim so re-advertisement round-trips it byte-exact
/// (§4.C: "unknown attributes are preserved byte-exact and participate
/// in equality"). Populated once the decoder's attribute-flag
/// validation pass (tracked in DESIGN.md's pending list) starts
/// surfacing them; the interning layer is ready for them today.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownAttr {
    pub typ: u8,
    pub flags: u8,
    pub value: Vec<u8>,
}

/// Content-addressed spec for one canonical `BgpAttr`. Every field that
/// has its own DB (AS-path, community, ext-community) is stored as a
/// `Handle`, so equality and hashing on `BgpAttrSpec` compose correctly
/// out of the sub-objects' own pointer identity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BgpAttrSpec {
    pub origin: Option<Origin>,
    pub aspath: Option<Handle<As4Path>>,
    pub nexthop: Option<BgpNexthop>,
    pub med: Option<Med>,
    pub local_pref: Option<LocalPref>,
    pub atomic_aggregate: Option<AtomicAggregate>,
    pub aggregator: Option<Aggregator>,
    pub community: Option<Handle<Community>>,
    pub originator_id: Option<OriginatorId>,
    pub cluster_list: Option<ClusterList>,
    pub ext_community: Option<Handle<ExtCommunity>>,
    pub pmsi_tunnel: Option<PmsiTunnel>,
    pub aigp: Option<Aigp>,
    pub large_community: Option<LargeCommunity>,
    /// Set by the replicator when a path is leaked into another VRF
    /// (§4.E step 3: "set source-rd to T_src's RD").
    pub source_rd: Option<RouteDistinguisher>,
    pub unknown: Vec<UnknownAttr>,
}

impl Default for BgpAttrSpec {
    fn default() -> Self {
        BgpAttrSpec {
            origin: None,
            aspath: None,
            nexthop: None,
            med: None,
            local_pref: None,
            atomic_aggregate: None,
            aggregator: None,
            community: None,
            originator_id: None,
            cluster_list: None,
            ext_community: None,
            pmsi_tunnel: None,
            aigp: None,
            large_community: None,
            source_rd: None,
            unknown: Vec::new(),
        }
    }
}

impl BgpAttrSpec {
    /// Neighbor AS for the MED same-neighbor-AS comparison rule (§4.D
    /// tiebreak 4): the AS closest to us in the path.
    pub fn neighboring_as(&self) -> Option<u32> {
        self.aspath.as_ref().and_then(|h| h.neighboring_as())
    }

    /// Flattens the interned spec into the plain, owned `BgpAttr` the
    /// codec's `attr_emit` knows how to serialize (§4.F message
    /// packing: the scheduler's message builder calls this once per
    /// distinct attribute set, not once per route). `source_rd` and
    /// `unknown` have no counterpart on the wire-level `BgpAttr` today
    /// — they're interning-layer-only until the codec grows slots for
    /// them.
    pub fn to_wire(&self) -> bgp_packet::BgpAttr {
        bgp_packet::BgpAttr {
            origin: self.origin,
            aspath: self.aspath.as_ref().map(|h| (**h).clone()),
            nexthop: self.nexthop.clone(),
            med: self.med.clone(),
            local_pref: self.local_pref.clone(),
            atomic_aggregate: self.atomic_aggregate.clone(),
            aggregator: self.aggregator.clone(),
            com: self.community.as_ref().map(|h| (**h).clone()),
            originator_id: self.originator_id.clone(),
            cluster_list: self.cluster_list.clone(),
            ecom: self.ext_community.as_ref().map(|h| (**h).clone()),
            pmsi_tunnel: self.pmsi_tunnel.clone(),
            aigp: self.aigp.clone(),
            lcom: self.large_community.clone(),
        }
    }
}

/// Bundles every sub-interner the attribute layer needs. One instance
/// lives on the `BgpServer` context (§9: no hidden globals — every
/// collaborator is threaded explicitly rather than reached through a
/// process-wide static).
pub struct AttrDb {
    pub aspath: Interner<As4Path>,
    pub community: Interner<Community>,
    pub ext_community: Interner<ExtCommunity>,
    pub attr: Interner<BgpAttrSpec>,
}

impl Default for AttrDb {
    fn default() -> Self {
        Self::new()
    }
}

impl AttrDb {
    pub fn new() -> Self {
        AttrDb {
            aspath: Interner::new(),
            community: Interner::new(),
            ext_community: Interner::new(),
            attr: Interner::new(),
        }
    }

    /// Intern a fully-built spec (AS-path/community/ext-community
    /// already interned into `Handle`s by the caller via this same DB's
    /// sub-interners). This is `BgpAttrDB::Locate`.
    pub fn locate(&self, spec: BgpAttrSpec) -> Handle<BgpAttrSpec> {
        self.attr.locate(spec)
    }

    /// `ReplaceSourceRdAndLocate`: derive a new canonical attribute with
    /// `source_rd` replaced, used by the replicator (§4.E) and
    /// exercised directly by the §8 property
    /// `ReplaceSourceRdAndLocate(attr, rd).source_rd == rd`.
    pub fn replace_source_rd_and_locate(
        &self,
        attr: &Handle<BgpAttrSpec>,
        rd: RouteDistinguisher,
    ) -> Handle<BgpAttrSpec> {
        self.attr.replace_and_locate(attr, |spec| spec.source_rd = Some(rd))
    }

    /// `ReplaceExtCommunityAndLocate`: used by the replicator to append
    /// the destination and source export route-targets onto a leaked
    /// path's ext-community set (§4.E step 3).
    pub fn replace_ext_community_and_locate(
        &self,
        attr: &Handle<BgpAttrSpec>,
        ext_community: Handle<ExtCommunity>,
    ) -> Handle<BgpAttrSpec> {
        self.attr
            .replace_and_locate(attr, |spec| spec.ext_community = Some(ext_community))
    }

    /// Intern a community value, canonicalizing (sort+dedup) first so
    /// that re-orderings of the same member set collapse to one object
    /// per §4.C / §8 ("differ only by re-ordering of
    /// Community/ExtCommunity/AS_SET members").
    pub fn locate_community(&self, mut com: Community) -> Handle<Community> {
        com.sort_uniq();
        self.community.locate(com)
    }

    pub fn locate_ext_community(&self, mut com: ExtCommunity) -> Handle<ExtCommunity> {
        com.sort_uniq();
        self.ext_community.locate(com)
    }

    /// AS-path segments are not canonicalized here (sequence order is
    /// path-significant); `As4Segment`'s own `PartialEq`/`Hash`
    /// canonicalizes only the unordered SET/CONFED_SET member lists, so
    /// plain `locate` already gives the right equality.
    pub fn locate_aspath(&self, aspath: As4Path) -> Handle<As4Path> {
        self.aspath.locate(aspath)
    }
}

/// `AsPath::Prepend(asn)` per §4.C: if the left-most segment is an
/// AS_SEQUENCE with fewer than 255 entries, push `asn` onto its front;
/// if the left-most segment is full or is an AS_SET, insert a new
/// one-entry AS_SEQUENCE segment at the front instead.
pub fn prepend_asn(path: &As4Path, asn: u32) -> As4Path {
    use bgp_packet::attrs::aspath::{AS_SEQ, As4Segment};

    let mut path = path.clone();
    match path.segs.front_mut() {
        Some(seg) if seg.typ == AS_SEQ && seg.asn.len() < 255 => {
            seg.asn.insert(0, asn);
        }
        _ => {
            let mut seg = As4Segment::new(AS_SEQ);
            seg.asn.push(asn);
            path.segs.push_front(seg);
        }
    }
    path.update_length();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgp_packet::attrs::aspath::{AS_SEQ, AS_SET, As4Segment};
    use std::collections::VecDeque;

    fn seq(asns: &[u32]) -> As4Path {
        let mut p = As4Path::new();
        p.segs.push_back(As4Segment {
            typ: AS_SEQ,
            asn: asns.to_vec(),
        });
        p.update_length();
        p
    }

    #[test]
    fn prepend_asn_extends_leading_sequence() {
        let p = seq(&[200, 300]);
        let out = prepend_asn(&p, 100);
        assert_eq!(out.segs.front().unwrap().asn, vec![100, 200, 300]);
    }

    #[test]
    fn prepend_asn_inserts_new_segment_before_leading_set() {
        let mut p = As4Path::new();
        p.segs = VecDeque::from(vec![As4Segment {
            typ: AS_SET,
            asn: vec![10, 20],
        }]);
        p.update_length();
        let out = prepend_asn(&p, 5);
        assert_eq!(out.segs.len(), 2);
        assert_eq!(out.segs.front().unwrap().typ, AS_SEQ);
        assert_eq!(out.segs.front().unwrap().asn, vec![5]);
    }

    #[test]
    fn locate_is_reorder_insensitive_for_as_set_members() {
        let db = AttrDb::new();
        let mut a = As4Path::new();
        a.segs.push_back(As4Segment {
            typ: AS_SET,
            asn: vec![1, 2, 3],
        });
        a.update_length();
        let mut b = As4Path::new();
        b.segs.push_back(As4Segment {
            typ: AS_SET,
            asn: vec![3, 1, 2],
        });
        b.update_length();

        let ha = db.locate_aspath(a);
        let hb = db.locate_aspath(b);
        assert_eq!(ha, hb);
        assert_eq!(db.aspath.len(), 1);
    }

    #[test]
    fn locate_is_reorder_insensitive_for_community_members() {
        let db = AttrDb::new();
        let a = db.locate_community(Community(vec![3, 1, 2]));
        let b = db.locate_community(Community(vec![1, 2, 3]));
        assert_eq!(a, b);
        assert_eq!(db.community.len(), 1);
    }

    #[test]
    fn replace_source_rd_and_locate_sets_the_field() {
        let db = AttrDb::new();
        let base = db.locate(BgpAttrSpec::default());
        let rd = RouteDistinguisher::asn(100, 1);
        let replaced = db.replace_source_rd_and_locate(&base, rd.clone());
        assert_eq!(replaced.source_rd, Some(rd));
        assert_ne!(base, replaced);
    }
}
