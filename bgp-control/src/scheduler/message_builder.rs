//! Message packing (§4.F): accumulates routes with an identical
//! attribute set into one UPDATE message until the encoder's capacity
//! is hit, then flushes — grounded directly on `bgp-packet`'s
//! `UpdatePacket` (`attr_emit` plus the `From<UpdatePacket> for
//! BytesMut` encoder already fills in the length fields).
//!
//! inet rides the base NLRI per the RFC, so `pack_inet_updates` needs no
//! MP_REACH plumbing. Every other family rides an MP_REACH attribute
//! instead; inet-vpn, inet6-vpn, and evpn MAC/IP routes additionally
//! carry a per-route label (a VNI, for evpn). Grounded directly on
//! `bgp-packet`'s `Vpnv4Reach`/`Vpnv4Nlri` (the same types
//! `UpdatePacket::pop_vpnv4` already packs a single VPNv4 update from),
//! and on the analogous `Ipv6Reach`/`Ipv6Nlri`, `Inet6VpnReach`/
//! `Inet6VpnNlri`, `EvpnReach`, `ErmVpnReach`, and `MvpnReach` — all of
//! which `MpNlriReachAttr::attr_emit` now dispatches to, and which
//! `From<UpdatePacket> for BytesMut` already calls unconditionally
//! alongside the base attributes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::BytesMut;
use ipnet::Ipv4Net;

use bgp_packet::{
    BGP_HEADER_LEN, BGP_PACKET_LEN, BgpHeader, BgpNexthop, BgpType, ErmVpnPrefix, EvpnMac,
    EvpnMulticast, EvpnPrefix, EvpnRoute, Inet6VpnNlri, Ipv4Nlri, Ipv6Nlri, Label, MpNlriReachAttr,
    MvpnPrefix, Prefix, Vpnv4Nexthop, Vpnv4Nlri, Vpnv4Reach,
};

use crate::attr_db::{BgpAttrSpec, Handle};

/// One route queued for packing: its prefix and the canonical attribute
/// set it was advertised with. `label` is only consulted for families
/// whose NLRI carries a per-route MPLS label (inet-vpn, inet6-vpn);
/// inet ignores it.
pub struct Announce {
    pub prefix: Prefix,
    pub attr: Handle<BgpAttrSpec>,
    pub label: Option<Label>,
}

/// Packs `announces` into the minimum number of UPDATE messages such
/// that every message carries routes sharing one attribute set and no
/// message exceeds `capacity` bytes. Non-inet prefixes are skipped (see
/// module docs); a real deployment would route them through MP_REACH
/// packing instead.
pub fn pack_inet_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let Prefix::Inet(_) = &announces[i].prefix else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let mut batch: Vec<Ipv4Net> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let Prefix::Inet(p) = &announces[j].prefix else { break };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(p.0);
            if encode(&attr, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode(&attr, &batch));
        i = j.max(i + 1);
    }
    out
}

fn encode(attr: &Handle<BgpAttrSpec>, prefixes: &[Ipv4Net]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.ipv4_update = prefixes
        .iter()
        .map(|net| Ipv4Nlri { id: 0, prefix: *net })
        .collect();
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// inet-vpn family, batching by (attribute set, MP_REACH nexthop) since
/// every route in one MP_REACH attribute shares a single nexthop on the
/// wire. Routes with no label are skipped — per §8, an inet-vpn route
/// with no label is not advertisable any more than an ErmVPN route with
/// no label-block is.
pub fn pack_inetvpn_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let (Prefix::InetVpn(_), Some(_)) = (&announces[i].prefix, announces[i].label) else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let nhop = vpnv4_nexthop(&attr);
        let mut batch: Vec<Vpnv4Nlri> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let (Prefix::InetVpn(p), Some(label)) = (&announces[j].prefix, announces[j].label)
            else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(Vpnv4Nlri {
                label,
                rd: p.rd,
                nlri: Ipv4Nlri { id: 0, prefix: p.net },
            });
            if encode_vpnv4(&attr, &nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_vpnv4(&attr, &nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

/// The MP_REACH nexthop for an inet-vpn attribute set, taken from the
/// attribute's own interned `BgpNexthop::Vpnv4` if the replicator or
/// peer state machine set one, or the unspecified address otherwise —
/// a real deployment always sets this when building the attribute.
fn vpnv4_nexthop(attr: &Handle<BgpAttrSpec>) -> Vpnv4Nexthop {
    match &attr.nexthop {
        Some(BgpNexthop::Vpnv4(nhop)) => nhop.clone(),
        _ => Vpnv4Nexthop {
            rd: Default::default(),
            nhop: Ipv4Addr::UNSPECIFIED,
        },
    }
}

fn encode_vpnv4(attr: &Handle<BgpAttrSpec>, nhop: &Vpnv4Nexthop, updates: &[Vpnv4Nlri]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::Vpnv4Reach(Vpnv4Reach {
        snpa: 0,
        nhop: nhop.clone(),
        updates: updates.to_vec(),
    }));
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// inet6 family, batching by (attribute set, MP_REACH nexthop) the same
/// way `pack_inetvpn_updates` does. inet6 NLRI carries no label, so
/// `label` is ignored here.
pub fn pack_inet6_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let Prefix::Inet6(_) = &announces[i].prefix else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let nhop = ipv6_nexthop(&attr);
        let mut batch: Vec<Ipv6Nlri> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let Prefix::Inet6(p) = &announces[j].prefix else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(Ipv6Nlri { id: 0, prefix: p.0 });
            if encode_ipv6(&attr, nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_ipv6(&attr, nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

/// The MP_REACH nexthop for an inet6 attribute set, taken from the
/// attribute's own interned `BgpNexthop::Ipv6` if one was set, or the
/// unspecified address otherwise — a real deployment always sets this
/// when building the attribute.
fn ipv6_nexthop(attr: &Handle<BgpAttrSpec>) -> Ipv6Addr {
    match &attr.nexthop {
        Some(BgpNexthop::Ipv6(nhop)) => *nhop,
        _ => Ipv6Addr::UNSPECIFIED,
    }
}

fn encode_ipv6(attr: &Handle<BgpAttrSpec>, nhop: Ipv6Addr, updates: &[Ipv6Nlri]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::Ipv6 {
        snpa: 0,
        nhop: IpAddr::V6(nhop),
        updates: updates.to_vec(),
    });
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// inet6-vpn family, batching by (attribute set, MP_REACH nexthop) the
/// same way `pack_inetvpn_updates` does. Routes with no label are
/// skipped for the same reason inet-vpn routes with no label are.
pub fn pack_inet6vpn_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let (Prefix::Inet6Vpn(_), Some(_)) = (&announces[i].prefix, announces[i].label) else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let nhop = inet6vpn_nexthop(&attr);
        let mut batch: Vec<Inet6VpnNlri> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let (Prefix::Inet6Vpn(p), Some(label)) = (&announces[j].prefix, announces[j].label)
            else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(Inet6VpnNlri {
                id: 0,
                label,
                rd: p.rd,
                prefix: p.net,
            });
            if encode_inet6vpn(&attr, nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_inet6vpn(&attr, nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

/// The MP_REACH nexthop for an inet6-vpn attribute set, taken from the
/// attribute's own interned `BgpNexthop::Ipv6` (inet6-vpn shares the
/// same nexthop shape as inet6) or the unspecified address otherwise.
fn inet6vpn_nexthop(attr: &Handle<BgpAttrSpec>) -> Ipv6Addr {
    match &attr.nexthop {
        Some(BgpNexthop::Ipv6(nhop)) => *nhop,
        _ => Ipv6Addr::UNSPECIFIED,
    }
}

fn encode_inet6vpn(
    attr: &Handle<BgpAttrSpec>,
    nhop: Ipv6Addr,
    updates: &[Inet6VpnNlri],
) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::Inet6Vpn {
        snpa: 0,
        nhop,
        updates: updates.to_vec(),
    });
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// ermvpn family. `ErmVpnPrefix` carries its own route-distinguisher and
/// label-block semantics in the key itself, so there is no separate
/// per-route label to thread through like inet-vpn/inet6-vpn have.
pub fn pack_ermvpn_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let Prefix::ErmVpn(_) = &announces[i].prefix else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let nhop = ermvpn_nexthop(&attr);
        let mut batch: Vec<ErmVpnPrefix> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let Prefix::ErmVpn(p) = &announces[j].prefix else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(*p);
            if encode_ermvpn(&attr, nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_ermvpn(&attr, nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

fn ermvpn_nexthop(attr: &Handle<BgpAttrSpec>) -> IpAddr {
    match &attr.nexthop {
        Some(BgpNexthop::ErmVpn(nhop)) => *nhop,
        _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    }
}

fn encode_ermvpn(attr: &Handle<BgpAttrSpec>, nhop: IpAddr, updates: &[ErmVpnPrefix]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::ErmVpn {
        snpa: 0,
        nhop,
        updates: updates.to_vec(),
    });
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// mvpn (MCAST-VPN) family, mirroring `pack_ermvpn_updates`.
pub fn pack_mvpn_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let Prefix::Mvpn(_) = &announces[i].prefix else {
            i += 1;
            continue;
        };
        let attr = announces[i].attr.clone();
        let nhop = mvpn_nexthop(&attr);
        let mut batch: Vec<MvpnPrefix> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let Prefix::Mvpn(p) = &announces[j].prefix else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let mut candidate = batch.clone();
            candidate.push(*p);
            if encode_mvpn(&attr, nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_mvpn(&attr, nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

fn mvpn_nexthop(attr: &Handle<BgpAttrSpec>) -> IpAddr {
    match &attr.nexthop {
        Some(BgpNexthop::Mvpn(nhop)) => *nhop,
        _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    }
}

fn encode_mvpn(attr: &Handle<BgpAttrSpec>, nhop: IpAddr, updates: &[MvpnPrefix]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::Mvpn {
        snpa: 0,
        nhop,
        updates: updates.to_vec(),
    });
    update.into()
}

/// Packs `announces` into the minimum number of UPDATE messages for the
/// evpn family. A MAC/IP advertisement route's VNI rides the same
/// per-route `label` field inet-vpn uses, so one with no label is not
/// advertisable; an inclusive-multicast route carries no label and is
/// never skipped on that basis.
pub fn pack_evpn_updates(announces: &[Announce], capacity: usize) -> Vec<BytesMut> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < announces.len() {
        let Prefix::Evpn(p) = &announces[i].prefix else {
            i += 1;
            continue;
        };
        if evpn_route(p, announces[i].label).is_none() {
            i += 1;
            continue;
        }
        let attr = announces[i].attr.clone();
        let nhop = evpn_nexthop(&attr);
        let mut batch: Vec<EvpnRoute> = Vec::new();
        let mut j = i;
        while j < announces.len() {
            let Prefix::Evpn(p) = &announces[j].prefix else {
                break;
            };
            if announces[j].attr != attr {
                break;
            }
            let Some(route) = evpn_route(p, announces[j].label) else {
                break;
            };
            let mut candidate = batch.clone();
            candidate.push(route);
            if encode_evpn(&attr, nhop, &candidate).len() > capacity && !batch.is_empty() {
                break;
            }
            batch = candidate;
            j += 1;
        }
        out.push(encode_evpn(&attr, nhop, &batch));
        i = j.max(i + 1);
    }
    out
}

/// `EvpnMac` has no field for the gateway IP address `EvpnPrefix::Mac`
/// carries, so it's dropped going into the wire route the same way
/// decode already drops it coming off the wire.
fn evpn_route(prefix: &EvpnPrefix, label: Option<Label>) -> Option<EvpnRoute> {
    match prefix {
        EvpnPrefix::Mac { rd, ether_tag, mac, .. } => {
            let label = label?;
            Some(EvpnRoute::Mac(EvpnMac {
                id: 0,
                rd: *rd,
                esi_type: 0,
                ether_tag: *ether_tag,
                mac: *mac,
                vni: label.label,
            }))
        }
        EvpnPrefix::Multicast { rd, ether_tag, origin } => Some(EvpnRoute::Multicast(EvpnMulticast {
            rd: *rd,
            ether_tag: *ether_tag,
            addr: *origin,
        })),
    }
}

fn evpn_nexthop(attr: &Handle<BgpAttrSpec>) -> IpAddr {
    match &attr.nexthop {
        Some(BgpNexthop::Evpn(nhop)) => *nhop,
        _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    }
}

fn encode_evpn(attr: &Handle<BgpAttrSpec>, nhop: IpAddr, updates: &[EvpnRoute]) -> BytesMut {
    let mut update = bgp_packet::UpdatePacket::new();
    update.header = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN);
    update.bgp_attr = Some(attr.to_wire());
    update.mp_update = Some(MpNlriReachAttr::Evpn {
        snpa: 0,
        nhop,
        updates: updates.to_vec(),
    });
    update.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_db::AttrDb;
    use std::str::FromStr;

    fn inet(s: &str) -> Prefix {
        Prefix::Inet(bgp_packet::InetPrefix::from_str(s).unwrap())
    }

    #[test]
    fn same_attribute_set_packs_into_one_message() {
        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec::default());
        let announces = vec![
            Announce { prefix: inet("10.0.0.0/24"), attr: attr.clone(), label: None },
            Announce { prefix: inet("10.0.1.0/24"), attr: attr.clone(), label: None },
        ];
        let msgs = pack_inet_updates(&announces, BGP_PACKET_LEN);
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn differing_attribute_sets_flush_into_separate_messages() {
        use bgp_packet::LocalPref;

        let db = AttrDb::new();
        let a = db.locate(BgpAttrSpec::default());
        let b = db.locate(BgpAttrSpec {
            local_pref: Some(LocalPref { local_pref: 200 }),
            ..Default::default()
        });
        let announces = vec![
            Announce { prefix: inet("10.0.0.0/24"), attr: a, label: None },
            Announce { prefix: inet("10.0.1.0/24"), attr: b, label: None },
        ];
        let msgs = pack_inet_updates(&announces, BGP_PACKET_LEN);
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn capacity_overflow_flushes_a_new_message() {
        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec::default());
        let announces: Vec<Announce> = (0..50)
            .map(|i| Announce {
                prefix: inet(&format!("10.{}.0.0/24", i)),
                attr: attr.clone(),
                label: None,
            })
            .collect();
        // A capacity far below what 50 prefixes need forces a flush
        // partway through, even though every route shares one attribute
        // set.
        let msgs = pack_inet_updates(&announces, BGP_HEADER_LEN as usize + 40);
        assert!(msgs.len() > 1, "small capacity must force multiple messages");
    }

    fn inetvpn(rd: &str, net: &str, label: u32) -> (Prefix, Label) {
        let rd = bgp_packet::RouteDistinguisher::from_str(rd).unwrap();
        let net: Ipv4Net = net.parse().unwrap();
        (
            Prefix::InetVpn(bgp_packet::InetVpnPrefix::new(rd, net)),
            Label::new(label, 0, true),
        )
    }

    #[test]
    fn vpnv4_same_attribute_set_packs_into_one_message() {
        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec {
            nexthop: Some(BgpNexthop::Vpnv4(Vpnv4Nexthop {
                rd: Default::default(),
                nhop: "192.168.1.1".parse().unwrap(),
            })),
            ..Default::default()
        });
        let (p1, l1) = inetvpn("100:1", "10.0.0.0/24", 100);
        let (p2, l2) = inetvpn("100:1", "10.0.1.0/24", 200);
        let announces = vec![
            Announce { prefix: p1, attr: attr.clone(), label: Some(l1) },
            Announce { prefix: p2, attr: attr.clone(), label: Some(l2) },
        ];
        let msgs = pack_inetvpn_updates(&announces, BGP_PACKET_LEN);
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn vpnv4_route_with_no_label_is_skipped() {
        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec::default());
        let (p1, _) = inetvpn("100:1", "10.0.0.0/24", 100);
        let announces = vec![Announce { prefix: p1, attr, label: None }];
        let msgs = pack_inetvpn_updates(&announces, BGP_PACKET_LEN);
        assert!(msgs.is_empty());
    }

    fn inet6(net: &str) -> Prefix {
        Prefix::Inet6(bgp_packet::Inet6Prefix::from_str(net).unwrap())
    }

    #[test]
    fn inet6_same_attribute_set_packs_into_one_message() {
        let db = AttrDb::new();
        let attr = db.locate(BgpAttrSpec {
            nexthop: Some(BgpNexthop::Ipv6("2001:db8::1".parse().unwrap())),
            ..Default::default()
        });
        let announces = vec![
            Announce { prefix: inet6("2001:db8:1::/48"), attr: attr.clone(), label: None },
            Announce { prefix: inet6("2001:db8:2::/48"), attr: attr.clone(), label: None },
        ];
        let msgs = pack_inet6_updates(&announces, BGP_PACKET_LEN);
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn inet6_differing_attribute_sets_flush_into_separate_messages() {
        use bgp_packet::LocalPref;

        let db = AttrDb::new();
        let a = db.locate(BgpAttrSpec {
            nexthop: Some(BgpNexthop::Ipv6("2001:db8::1".parse().unwrap())),
            ..Default::default()
        });
        let b = db.locate(BgpAttrSpec {
            nexthop: Some(BgpNexthop::Ipv6("2001:db8::1".parse().unwrap())),
            local_pref: Some(LocalPref { local_pref: 200 }),
            ..Default::default()
        });
        let announces = vec![
            Announce { prefix: inet6("2001:db8:1::/48"), attr: a, label: None },
            Announce { prefix: inet6("2001:db8:2::/48"), attr: b, label: None },
        ];
        let msgs = pack_inet6_updates(&announces, BGP_PACKET_LEN);
        assert_eq!(msgs.len(), 2);
    }
}
