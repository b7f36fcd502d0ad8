use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv4Net;
use nom::IResult;
use nom::bytes::complete::take;
use nom::number::complete::be_u8;

use crate::{RouteDistinguisher, u32_u24};

use super::PrefixError;

/// Route key for l3vpn (inet-vpn): a route distinguisher plus an IPv4
/// prefix. The MPLS label is part of the NLRI on the wire but belongs to
/// the path, not the routing key, so it travels out-of-band here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InetVpnPrefix {
    pub rd: RouteDistinguisher,
    pub net: Ipv4Net,
}

impl InetVpnPrefix {
    pub fn new(rd: RouteDistinguisher, net: Ipv4Net) -> Self {
        Self {
            rd,
            net: net.trunc(),
        }
    }

    /// `{1-byte bit-length, 3-byte label, 8-byte RD, ceil((len-88)/8) address bytes}`.
    /// Returns the decoded prefix and the label carried alongside it.
    pub fn from_wire(input: &[u8]) -> IResult<&[u8], (Self, u32)> {
        let (input, total_bits) = be_u8(input)?;
        if total_bits < 88 || total_bits > 88 + 32 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        let (input, label_bytes) = take(3usize)(input)?;
        let label = u32::from_be_bytes([0, label_bytes[0], label_bytes[1], label_bytes[2]]) >> 4;
        let (input, rd_bytes) = take(8usize)(input)?;
        let mut rd_arr = [0u8; 8];
        rd_arr.copy_from_slice(rd_bytes);
        let rd = RouteDistinguisher::from_bytes(&rd_arr);
        let addr_bits = total_bits - 88;
        let nbytes = addr_bits.div_ceil(8) as usize;
        let (input, bytes) = take(nbytes)(input)?;
        let mut octets = [0u8; 4];
        octets[..nbytes].copy_from_slice(bytes);
        let net = Ipv4Net::new(octets.into(), addr_bits)
            .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))?
            .trunc();
        Ok((input, (InetVpnPrefix { rd, net }, label)))
    }

    pub fn to_wire(&self, label: u32, buf: &mut BytesMut) {
        let addr_bits = self.net.prefix_len();
        buf.put_u8(88 + addr_bits);
        let label_shifted = (label << 4) | 0x1; // bottom-of-stack bit set
        buf.put(&u32_u24(label_shifted)[..]);
        self.rd.encode(buf);
        let nbytes = (addr_bits as usize).div_ceil(8);
        let octets = self.net.network().octets();
        buf.put(&octets[..nbytes]);
    }

    pub fn is_more_specific(&self, other: &InetVpnPrefix) -> bool {
        self.net.prefix_len() >= other.net.prefix_len() && other.net.contains(&self.net.network())
    }
}

impl FromStr for InetVpnPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rd_part, net_part) = s.rsplit_once(':').ok_or_else(|| PrefixError(s.to_string()))?;
        let rd = RouteDistinguisher::from_str(rd_part).map_err(|_| PrefixError(s.to_string()))?;
        let net: Ipv4Net = net_part.parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(InetVpnPrefix {
            rd,
            net: net.trunc(),
        })
    }
}

impl fmt::Display for InetVpnPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rd, self.net)
    }
}

impl PartialOrd for InetVpnPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InetVpnPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rd
            .cmp(&other.rd)
            .then(self.net.network().cmp(&other.net.network()))
            .then(self.net.prefix_len().cmp(&other.net.prefix_len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let p = InetVpnPrefix::from_str("100:200:10.0.0.0/24").unwrap();
        assert_eq!(p.to_string(), "100:200:10.0.0.0/24");
    }

    #[test]
    fn wire_round_trip_carries_label() {
        let p = InetVpnPrefix::new(RouteDistinguisher::asn(100, 200), "10.0.0.0/24".parse().unwrap());
        let mut buf = BytesMut::new();
        p.to_wire(42, &mut buf);
        let (rest, (decoded, label)) = InetVpnPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
        assert_eq!(label, 42);
    }

    #[test]
    fn more_specific_ignores_rd() {
        let a = InetVpnPrefix::new(RouteDistinguisher::asn(1, 1), "10.0.0.0/25".parse().unwrap());
        let b = InetVpnPrefix::new(RouteDistinguisher::asn(2, 2), "10.0.0.0/24".parse().unwrap());
        assert!(a.is_more_specific(&b));
    }
}
