use std::net::IpAddr;

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u8, be_u32};
use nom_derive::*;

use crate::{Afi, AttrType, ExtCommunityValue, ParseNlri, Safi};

use super::{AttrEmitter, AttrFlags};

#[derive(Debug, Clone)]
pub struct Rtcv4 {
    pub id: u32,
    pub asn: u32,
    pub rt: ExtCommunityValue,
}

impl ParseNlri<Rtcv4> for Rtcv4 {
    fn parse_nlri(input: &[u8], addpath: bool) -> IResult<&[u8], Rtcv4> {
        let (input, id) = if addpath { be_u32(input)? } else { (input, 0) };
        let (input, plen) = be_u8(input)?;
        if plen != 96 {
            return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue)));
        }
        let (input, asn) = be_u32(input)?;
        let (input, rt) = ExtCommunityValue::parse_be(input)?;
        let nlri = Rtcv4 { id, asn, rt };
        Ok((input, nlri))
    }
}

/// MP_REACH body for the RT-constraint family (AFI Ip / SAFI Rtc).
/// Nexthop may be IPv4 or IPv6 on the wire; emitted here in whichever
/// form it was built in.
#[derive(Debug, Clone)]
pub struct Rtcv4Reach {
    pub snpa: u8,
    pub nhop: IpAddr,
    pub updates: Vec<Rtcv4>,
}

impl AttrEmitter for Rtcv4Reach {
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
        buf.put_u16(u16::from(Afi::Ip));
        buf.put_u8(u8::from(Safi::Rtc));
        match self.nhop {
            IpAddr::V4(v4) => {
                buf.put_u8(4);
                buf.put(&v4.octets()[..]);
            }
            IpAddr::V6(v6) => {
                buf.put_u8(16);
                buf.put(&v6.octets()[..]);
            }
        }
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            if update.id != 0 {
                buf.put_u32(update.id);
            }
            buf.put_u8(96);
            buf.put_u32(update.asn);
            update.rt.encode(buf);
        }
    }
}
