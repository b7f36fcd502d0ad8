use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::bytes::complete::take;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u8, be_u24, be_u32};
use nom_derive::*;

use crate::{AttrType, ParseNlri, RouteDistinguisher, nlri_psize, u32_u24};

use super::{AttrEmitter, AttrFlags};

#[derive(Debug, Clone)]
pub enum EvpnRouteType {
    EthernetAd,    // 1
    MacIpAdvRoute, // 2
    IncMulticast,  // 3
    EthernetSr,    // 4
    Unknown(u8),
}

impl From<EvpnRouteType> for u8 {
    fn from(val: EvpnRouteType) -> u8 {
        use EvpnRouteType::*;
        match val {
            EthernetAd => 1,
            MacIpAdvRoute => 2,
            IncMulticast => 3,
            EthernetSr => 4,
            Unknown(val) => val,
        }
    }
}

impl From<u8> for EvpnRouteType {
    fn from(val: u8) -> Self {
        use EvpnRouteType::*;
        match val {
            1 => EthernetAd,
            2 => MacIpAdvRoute,
            3 => IncMulticast,
            4 => EthernetSr,
            _ => Unknown(val),
        }
    }
}

#[derive(Debug)]
pub struct Evpn {
    pub route_type: EvpnRouteType,
    pub rd: RouteDistinguisher,
    pub ether_tag: u32,
}

#[derive(Debug, Clone)]
pub enum EvpnRoute {
    Mac(EvpnMac),
    Multicast(EvpnMulticast),
}

#[derive(Debug, Clone)]
pub struct EvpnMac {
    pub id: u32,
    pub rd: RouteDistinguisher,
    pub esi_type: u8,
    pub ether_tag: u32,
    pub mac: [u8; 6],
    pub vni: u32,
}

#[derive(Debug, Clone)]
pub struct EvpnMulticast {
    pub rd: RouteDistinguisher,
    pub ether_tag: u32,
    pub addr: IpAddr,
}

impl Evpn {
    pub fn rd(&self) -> &RouteDistinguisher {
        &self.rd
    }
}

impl ParseNlri<EvpnRoute> for EvpnRoute {
    fn parse_nlri(input: &[u8], addpath: bool) -> IResult<&[u8], EvpnRoute> {
        let (input, id) = if addpath { be_u32(input)? } else { (input, 0) };
        let (input, typ) = be_u8(input)?;
        let route_type: EvpnRouteType = typ.into();
        let (input, _length) = be_u8(input)?;

        use EvpnRouteType::*;
        match route_type {
            MacIpAdvRoute => {
                let (input, rd) = RouteDistinguisher::parse_be(input)?;

                let (input, esi_type) = be_u8(input)?;
                let (input, _esi) = take(9usize).parse(input)?;
                let (input, ether_tag) = be_u32(input)?;

                let (input, mac_len) = be_u8(input)?;
                let mac_size = nlri_psize(mac_len);
                if mac_size != 6 {
                    return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue)));
                }
                let (input, mac) = take(6usize).parse(input)?;
                let (input, ip_len) = be_u8(input)?;
                let ip_size = nlri_psize(ip_len);
                let (input, _) = if ip_size != 0 {
                    take(ip_size).parse(input)?
                } else {
                    (input, &[] as &[u8])
                };
                let (input, vni) = be_u24(input)?;

                let mut evpn = EvpnMac {
                    id,
                    rd,
                    esi_type,
                    ether_tag,
                    mac: [0u8; 6],
                    vni,
                };
                evpn.mac.copy_from_slice(mac);

                Ok((input, EvpnRoute::Mac(evpn)))
            }
            IncMulticast => {
                let (input, rd) = RouteDistinguisher::parse_be(input)?;
                let (input, ether_tag) = be_u32(input)?;
                let (input, addr_len) = be_u8(input)?;
                let (input, addr) = if addr_len == 32 {
                    let (input, val) = be_u32(input)?;
                    let nhop = IpAddr::V4(Ipv4Addr::from(val));
                    (input, nhop)
                } else {
                    let (input, val) = take(16usize).parse(input)?;
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(val);
                    let addr = Ipv6Addr::from(octets);
                    let nhop = IpAddr::V6(addr);
                    (input, nhop)
                };
                let evpn = EvpnMulticast {
                    rd,
                    ether_tag,
                    addr,
                };

                Ok((input, EvpnRoute::Multicast(evpn)))
            }
            _ => Err(nom::Err::Error(make_error(input, ErrorKind::NoneOf))),
        }
    }
}

impl EvpnRoute {
    /// Inverse of `parse_nlri`. The gateway IP address on a MAC/IP
    /// advertisement route isn't retained by `EvpnMac` (it's parsed and
    /// dropped today), so it round-trips as an empty IP component.
    pub fn to_wire(&self, buf: &mut BytesMut) {
        match self {
            EvpnRoute::Mac(m) => {
                if m.id != 0 {
                    buf.put_u32(m.id);
                }
                buf.put_u8(EvpnRouteType::MacIpAdvRoute.into());
                buf.put_u8(33); // RD(8)+esi(10)+tag(4)+maclen(1)+mac(6)+iplen(1)+vni(3)
                m.rd.encode(buf);
                buf.put_u8(m.esi_type);
                buf.put(&[0u8; 9][..]);
                buf.put_u32(m.ether_tag);
                buf.put_u8(48);
                buf.put(&m.mac[..]);
                buf.put_u8(0);
                buf.put(&u32_u24(m.vni)[..]);
            }
            EvpnRoute::Multicast(m) => {
                let (addr_len, addr_bytes): (u8, Vec<u8>) = match m.addr {
                    IpAddr::V4(v4) => (32, v4.octets().to_vec()),
                    IpAddr::V6(v6) => (128, v6.octets().to_vec()),
                };
                buf.put_u8(EvpnRouteType::IncMulticast.into());
                buf.put_u8(8 + 4 + 1 + addr_bytes.len() as u8);
                m.rd.encode(buf);
                buf.put_u32(m.ether_tag);
                buf.put_u8(addr_len);
                buf.put(&addr_bytes[..]);
            }
        }
    }
}

/// MP_REACH body for the evpn family, mirroring `Vpnv4Reach`'s shape:
/// one nexthop shared across a batch of NLRI.
pub struct EvpnReach {
    pub snpa: u8,
    pub nhop: IpAddr,
    pub updates: Vec<EvpnRoute>,
}

impl AttrEmitter for EvpnReach {
    fn attr_type(&self) -> AttrType {
        AttrType::MpReachNlri
    }

    fn attr_flags(&self) -> AttrFlags {
        AttrFlags::new().with_optional(true)
    }

    fn len(&self) -> Option<usize> {
        None
    }

    fn emit(&self, buf: &mut BytesMut) {
        buf.put_u16(u16::from(crate::Afi::L2vpn));
        buf.put_u8(u8::from(crate::Safi::Evpn));
        let octets = match self.nhop {
            IpAddr::V4(v4) => {
                buf.put_u8(4);
                v4.octets().to_vec()
            }
            IpAddr::V6(v6) => {
                buf.put_u8(16);
                v6.octets().to_vec()
            }
        };
        buf.put(&octets[..]);
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            update.to_wire(buf);
        }
    }
}
