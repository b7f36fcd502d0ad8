use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv6Net;
use nom::IResult;
use nom::bytes::complete::take;
use nom::number::complete::be_u8;

use crate::{RouteDistinguisher, u32_u24};

use super::PrefixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inet6VpnPrefix {
    pub rd: RouteDistinguisher,
    pub net: Ipv6Net,
}

impl Inet6VpnPrefix {
    pub fn new(rd: RouteDistinguisher, net: Ipv6Net) -> Self {
        Self {
            rd,
            net: net.trunc(),
        }
    }

    pub fn from_wire(input: &[u8]) -> IResult<&[u8], (Self, u32)> {
        let (input, total_bits) = be_u8(input)?;
        if total_bits < 88 || total_bits > 88 + 128 {
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
        let mut octets = [0u8; 16];
        octets[..nbytes].copy_from_slice(bytes);
        let net = Ipv6Net::new(octets.into(), addr_bits)
            .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))?
            .trunc();
        Ok((input, (Inet6VpnPrefix { rd, net }, label)))
    }

    pub fn to_wire(&self, label: u32, buf: &mut BytesMut) {
        let addr_bits = self.net.prefix_len();
        buf.put_u8(88 + addr_bits);
        let label_shifted = (label << 4) | 0x1;
        buf.put(&u32_u24(label_shifted)[..]);
        self.rd.encode(buf);
        let nbytes = (addr_bits as usize).div_ceil(8);
        let octets = self.net.network().octets();
        buf.put(&octets[..nbytes]);
    }

    pub fn is_more_specific(&self, other: &Inet6VpnPrefix) -> bool {
        self.net.prefix_len() >= other.net.prefix_len() && other.net.contains(&self.net.network())
    }
}

impl FromStr for Inet6VpnPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rd_part, net_part) = s.rsplit_once(':').ok_or_else(|| PrefixError(s.to_string()))?;
        let rd = RouteDistinguisher::from_str(rd_part).map_err(|_| PrefixError(s.to_string()))?;
        let net: Ipv6Net = net_part.parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(Inet6VpnPrefix {
            rd,
            net: net.trunc(),
        })
    }
}

impl fmt::Display for Inet6VpnPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rd, self.net)
    }
}

impl PartialOrd for Inet6VpnPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Inet6VpnPrefix {
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
    fn wire_round_trip_carries_label() {
        let p = Inet6VpnPrefix::new(RouteDistinguisher::asn(1, 1), "2001:db8::/32".parse().unwrap());
        let mut buf = BytesMut::new();
        p.to_wire(7, &mut buf);
        let (rest, (decoded, label)) = Inet6VpnPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
        assert_eq!(label, 7);
    }
}
