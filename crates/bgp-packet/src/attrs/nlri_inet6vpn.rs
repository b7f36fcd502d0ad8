use std::fmt;
use std::net::Ipv6Addr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv6Net;
use nom::IResult;
use nom::Parser;
use nom::bytes::complete::take;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u8, be_u32};

use crate::{Afi, AttrType, Label, ParseNlri, RouteDistinguisher, Safi, nlri_psize};

use super::{AttrEmitter, AttrFlags};

/// NLRI for the inet6-vpn family: `{plen, label, rd, ipv6 address}`,
/// the same shape as `Vpnv4Nlri` widened to 128-bit addresses.
#[derive(Debug, Clone)]
pub struct Inet6VpnNlri {
    pub id: u32,
    pub label: Label,
    pub rd: RouteDistinguisher,
    pub prefix: Ipv6Net,
}

impl ParseNlri<Inet6VpnNlri> for Inet6VpnNlri {
    fn parse_nlri(input: &[u8], add_path: bool) -> IResult<&[u8], Inet6VpnNlri> {
        let (input, id) = if add_path { be_u32(input)? } else { (input, 0) };

        let (input, mut plen) = be_u8(input)?;
        let (input, label_bytes) = take(3usize).parse(input)?;
        let label = Label::from(label_bytes);

        let (input, rd) = RouteDistinguisher::parse_be(input)?;

        if plen < 88 {
            return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue)));
        }
        plen -= 88;
        let psize = nlri_psize(plen);
        if psize > 16 || psize > input.len() {
            return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue)));
        }

        let mut paddr = [0u8; 16];
        paddr[..psize].copy_from_slice(&input[..psize]);
        let (input, _) = take(psize).parse(input)?;
        let prefix = Ipv6Net::new(Ipv6Addr::from(paddr), plen).expect("Ipv6Net create error");

        Ok((
            input,
            Inet6VpnNlri {
                id,
                label,
                rd,
                prefix,
            },
        ))
    }
}

impl fmt::Display for Inet6VpnNlri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VPNv6 [{}]:[{}]{} label: {}",
            self.rd, self.id, self.prefix, self.label.label,
        )
    }
}

/// MP_REACH body for the inet6-vpn family, mirroring `Vpnv4Reach`'s
/// shape: one nexthop shared across a batch of NLRI.
pub struct Inet6VpnReach {
    pub snpa: u8,
    pub nhop: Ipv6Addr,
    pub updates: Vec<Inet6VpnNlri>,
}

impl AttrEmitter for Inet6VpnReach {
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
        buf.put_u16(u16::from(Afi::Ip6));
        buf.put_u8(u8::from(Safi::MplsVpn));
        buf.put_u8(24); // Nexthop length: RD(8) + IPv6 nexthop(16).
        let rd = [0u8; 8];
        buf.put(&rd[..]);
        buf.put(&self.nhop.octets()[..]);
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            if update.id != 0 {
                buf.put_u32(update.id);
            }
            let plen = update.prefix.prefix_len() + 88;
            buf.put_u8(plen);
            buf.put(&update.label.to_bytes()[..]);
            buf.put_u16(update.rd.typ as u16);
            buf.put(&update.rd.val[..]);
            let nbytes = nlri_psize(update.prefix.prefix_len());
            buf.put(&update.prefix.network().octets()[..nbytes]);
        }
    }
}
