use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv6Net;
use nom::IResult;
use nom::bytes::complete::take;
use nom::number::complete::be_u8;

use super::PrefixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inet6Prefix(pub Ipv6Net);

impl Inet6Prefix {
    pub fn new(net: Ipv6Net) -> Self {
        Self(net)
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, plen) = be_u8(input)?;
        if plen > 128 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        let nbytes = plen.div_ceil(8) as usize;
        let (input, bytes) = take(nbytes)(input)?;
        let mut octets = [0u8; 16];
        octets[..nbytes].copy_from_slice(bytes);
        let net = Ipv6Net::new(octets.into(), plen)
            .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))?
            .trunc();
        Ok((input, Inet6Prefix(net)))
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        let plen = self.0.prefix_len();
        buf.put_u8(plen);
        let nbytes = (plen as usize).div_ceil(8);
        let octets = self.0.network().octets();
        buf.put(&octets[..nbytes]);
    }

    pub fn is_more_specific(&self, other: &Inet6Prefix) -> bool {
        self.0.prefix_len() >= other.0.prefix_len() && other.0.contains(&self.0.network())
    }
}

impl FromStr for Inet6Prefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv6Net = s.parse().map_err(|_| PrefixError(s.to_string()))?;
        Ok(Inet6Prefix(net.trunc()))
    }
}

impl fmt::Display for Inet6Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Inet6Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Inet6Prefix {
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
    fn wire_round_trip() {
        let p = Inet6Prefix::from_str("2001:db8::/32").unwrap();
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = Inet6Prefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }
}
