use std::net::{IpAddr, Ipv6Addr};

use bytes::{BufMut, BytesMut};
use ipnet::Ipv6Net;
use nom::IResult;
use nom::bytes::complete::take;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u8, be_u32};
use nom_derive::*;

use crate::{Afi, AttrType, ParseBe, ParseNlri, Safi, nlri_psize};

use super::{AttrEmitter, AttrFlags};

#[derive(Debug, Clone)]
pub struct Ipv6Nlri {
    pub id: u32,
    pub prefix: Ipv6Net,
}

impl ParseNlri<Ipv6Nlri> for Ipv6Nlri {
    fn parse_nlri(input: &[u8], add_path: bool) -> IResult<&[u8], Ipv6Nlri> {
        let (input, id) = if add_path { be_u32(input)? } else { (input, 0) };
        let (input, plen) = be_u8(input)?;
        let psize = nlri_psize(plen);
        if input.len() < psize {
            return Err(nom::Err::Error(make_error(input, ErrorKind::Eof)));
        }
        let mut paddr = [0u8; 16];
        paddr[..psize].copy_from_slice(&input[..psize]);
        let (input, _) = take(psize).parse(input)?;
        let prefix = Ipv6Net::new(Ipv6Addr::from(paddr), plen).expect("Ipv6Net create error");
        let nlri = Ipv6Nlri { id, prefix };
        Ok((input, nlri))
    }
}

impl ParseBe<Ipv6Net> for Ipv6Net {
    fn parse_be(input: &[u8]) -> IResult<&[u8], Ipv6Net> {
        let (input, plen) = be_u8(input)?;
        let psize = nlri_psize(plen);
        if input.len() < psize {
            return Err(nom::Err::Error(make_error(input, ErrorKind::Eof)));
        }
        let mut paddr = [0u8; 16];
        paddr[..psize].copy_from_slice(&input[..psize]);
        let (input, _) = take(psize).parse(input)?;
        let prefix = Ipv6Net::new(Ipv6Addr::from(paddr), plen).expect("Ipv6Net create error");

        Ok((input, prefix))
    }
}

/// MP_REACH body for the inet6/unicast family, mirroring `Vpnv4Reach`'s
/// shape: one nexthop shared across a batch of NLRI.
pub struct Ipv6Reach {
    pub snpa: u8,
    pub nhop: IpAddr,
    pub updates: Vec<Ipv6Nlri>,
}

impl AttrEmitter for Ipv6Reach {
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
        buf.put_u8(u8::from(Safi::Unicast));
        buf.put_u8(16); // Nexthop length.
        let octets = match self.nhop {
            IpAddr::V6(v6) => v6.octets(),
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
        };
        buf.put(&octets[..]);
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            if update.id != 0 {
                buf.put_u32(update.id);
            }
            let plen = update.prefix.prefix_len();
            buf.put_u8(plen);
            let nbytes = nlri_psize(plen);
            buf.put(&update.prefix.network().octets()[..nbytes]);
        }
    }
}
