use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use bytes::BytesMut;
use nom::IResult;
use nom::number::complete::be_u8;

use crate::RouteDistinguisher;

use super::mvpn::{parse_addr, put_addr};
use super::PrefixError;

/// Edge-replication-model multicast route key: same wire shape as
/// `MvpnPrefix` (`{1-byte type, RD, router-id, group, source}`) but a
/// distinct family, since an ermvpn table replicates multicast trees
/// within a single VRF rather than announcing them between VRFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErmVpnPrefix {
    pub route_type: u8,
    pub rd: RouteDistinguisher,
    pub router_id: std::net::Ipv4Addr,
    pub group: IpAddr,
    pub source: IpAddr,
}

impl ErmVpnPrefix {
    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, route_type) = be_u8(input)?;
        let (input, _length) = be_u8(input)?;
        let (input, rd) = RouteDistinguisher::parse_be(input)?;
        let (input, router_id_val) = nom::number::complete::be_u32(input)?;
        let router_id = std::net::Ipv4Addr::from(router_id_val);
        let (input, group_bits) = be_u8(input)?;
        let (input, group) = parse_addr(input, group_bits)?;
        let (input, source_bits) = be_u8(input)?;
        let (input, source) = parse_addr(input, source_bits)?;
        Ok((
            input,
            ErmVpnPrefix {
                route_type,
                rd,
                router_id,
                group,
                source,
            },
        ))
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        use bytes::BufMut;
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

impl FromStr for ErmVpnPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(5, '/').collect();
        if parts.len() != 5 {
            return Err(PrefixError(s.to_string()));
        }
        let route_type: u8 = parts[0].parse().map_err(|_| PrefixError(s.to_string()))?;
        let rd = RouteDistinguisher::from_str(parts[1]).map_err(|_| PrefixError(s.to_string()))?;
        let router_id = parts[2].parse().map_err(|_| PrefixError(s.to_string()))?;
        let group = parts[3].parse().map_err(|_| PrefixError(s.to_string()))?;
        let source = parts[4].parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(ErmVpnPrefix {
            route_type,
            rd,
            router_id,
            group,
            source,
        })
    }
}

impl fmt::Display for ErmVpnPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.route_type, self.rd, self.router_id, self.group, self.source
        )
    }
}

impl PartialOrd for ErmVpnPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ErmVpnPrefix {
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
        let p = ErmVpnPrefix {
            route_type: 3,
            rd: RouteDistinguisher::asn(1, 1),
            router_id: "10.0.0.1".parse().unwrap(),
            group: "239.1.1.1".parse().unwrap(),
            source: "10.0.0.2".parse().unwrap(),
        };
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = ErmVpnPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }
}
