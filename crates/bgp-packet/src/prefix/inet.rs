use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv4Net;
use nom::IResult;
use nom::bytes::complete::take;
use nom::number::complete::be_u8;

use super::PrefixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InetPrefix(pub Ipv4Net);

impl InetPrefix {
    pub fn new(net: Ipv4Net) -> Self {
        Self(net)
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// `{1-byte prefix length, ceil(len/8) address bytes}`.
    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, plen) = be_u8(input)?;
        if plen > 32 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        let nbytes = plen.div_ceil(8) as usize;
        let (input, bytes) = take(nbytes)(input)?;
        let mut octets = [0u8; 4];
        octets[..nbytes].copy_from_slice(bytes);
        let net = Ipv4Net::new(octets.into(), plen)
            .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))?
            .trunc();
        Ok((input, InetPrefix(net)))
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        let plen = self.0.prefix_len();
        buf.put_u8(plen);
        let nbytes = (plen as usize).div_ceil(8);
        let octets = self.0.network().octets();
        buf.put(&octets[..nbytes]);
    }

    pub fn is_more_specific(&self, other: &InetPrefix) -> bool {
        self.0.prefix_len() >= other.0.prefix_len() && other.0.contains(&self.0.network())
    }
}

impl FromStr for InetPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv4Net = s.parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(InetPrefix(net.trunc()))
    }
}

impl fmt::Display for InetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for InetPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InetPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .network()
            .cmp(&other.0.network())
            .then(self.0.prefix_len().cmp(&other.0.prefix_len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let p = InetPrefix::from_str("10.1.2.0/24").unwrap();
        assert_eq!(p.to_string(), "10.1.2.0/24");
    }

    #[test]
    fn wire_round_trip() {
        let p = InetPrefix::from_str("192.168.0.0/20").unwrap();
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = InetPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }

    #[test]
    fn more_specific() {
        let narrow = InetPrefix::from_str("10.1.2.0/25").unwrap();
        let wide = InetPrefix::from_str("10.1.2.0/24").unwrap();
        assert!(narrow.is_more_specific(&wide));
        assert!(!wide.is_more_specific(&narrow));
    }

    #[test]
    fn rejects_oversize_prefix_len() {
        let mut buf = BytesMut::new();
        buf.put_u8(33);
        assert!(InetPrefix::from_wire(&buf).is_err());
    }
}
