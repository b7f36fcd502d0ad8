use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::bytes::complete::take;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u32, be_u8};

use crate::RouteDistinguisher;

use super::PrefixError;

/// Multicast-VPN (MCAST-VPN, AFI/SAFI 1 or 2 / 5) source-tree join route
/// key: `{1-byte type, RD, router-id, group, source}`. Only the
/// source-active/source-tree route types carried between VRFs are
/// modeled; leaf A-D and S-PMSI discovery routes are out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MvpnPrefix {
    pub route_type: u8,
    pub rd: RouteDistinguisher,
    pub router_id: std::net::Ipv4Addr,
    pub group: IpAddr,
    pub source: IpAddr,
}

impl MvpnPrefix {
    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, route_type) = be_u8(input)?;
        let (input, _length) = be_u8(input)?;
        let (input, rd) = RouteDistinguisher::parse_be(input)?;
        let (input, router_id_val) = be_u32(input)?;
        let router_id = std::net::Ipv4Addr::from(router_id_val);
        let (input, group_bits) = be_u8(input)?;
        let (input, group) = parse_addr(input, group_bits)?;
        let (input, source_bits) = be_u8(input)?;
        let (input, source) = parse_addr(input, source_bits)?;
        Ok((
            input,
            MvpnPrefix {
                route_type,
                rd,
                router_id,
                group,
                source,
            },
        ))
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        let mut body = BytesMut::new();
        self.rd.encode(&mut body);
        body.put_u32(u32::from(self.router_id));
        put_addr(&mut body, self.group);
        put_addr(&mut body, self.source);
        buf.put_u8(self.route_type);
        buf.put_u8(body.len() as u8);
        buf.put(body);
    }
}

pub(crate) fn parse_addr(input: &[u8], bits: u8) -> IResult<&[u8], IpAddr> {
    match bits {
        32 => {
            let (input, v) = be_u32(input)?;
            Ok((input, IpAddr::from(std::net::Ipv4Addr::from(v))))
        }
        128 => {
            let (input, v) = take(16usize)(input)?;
            let mut octets = [0u8; 16];
            octets.copy_from_slice(v);
            Ok((input, IpAddr::from(std::net::Ipv6Addr::from(octets))))
        }
        _ => Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue))),
    }
}

pub(crate) fn put_addr(buf: &mut BytesMut, addr: IpAddr) {
    match addr {
        IpAddr::V4(v4) => {
            buf.put_u8(32);
            buf.put(&v4.octets()[..]);
        }
        IpAddr::V6(v6) => {
            buf.put_u8(128);
            buf.put(&v6.octets()[..]);
        }
    }
}

impl FromStr for MvpnPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `type/rd/router-id/group/source`
        let parts: Vec<&str> = s.splitn(5, '/').collect();
        if parts.len() != 5 {
            return Err(PrefixError(s.to_string()));
        }
        let route_type: u8 = parts[0].parse().map_err(|_| PrefixError(s.to_string()))?;
        let rd = RouteDistinguisher::from_str(parts[1]).map_err(|_| PrefixError(s.to_string()))?;
        let router_id = parts[2].parse().map_err(|_| PrefixError(s.to_string()))?;
        let group = parts[3].parse().map_err(|_| PrefixError(s.to_string()))?;
        let source = parts[4].parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(MvpnPrefix {
            route_type,
            rd,
            router_id,
            group,
            source,
        })
    }
}

impl fmt::Display for MvpnPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.route_type, self.rd, self.router_id, self.group, self.source
        )
    }
}

impl PartialOrd for MvpnPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MvpnPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rd
            .cmp(&other.rd)
            .then(self.route_type.cmp(&other.route_type))
            .then(self.group.cmp(&other.group))
            .then(self.source.cmp(&other.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        let p = MvpnPrefix {
            route_type: 5,
            rd: RouteDistinguisher::asn(100, 1),
            router_id: "1.2.3.4".parse().unwrap(),
            group: "239.1.1.1".parse().unwrap(),
            source: "10.0.0.1".parse().unwrap(),
        };
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = MvpnPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }
}
