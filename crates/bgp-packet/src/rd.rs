use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::number::complete::{be_u16, be_u32};

/// RFC 4364 route-distinguisher type field. Only the two forms actually
/// carried by VPN NLRI in this codec are modeled: 2-byte ASN and IPv4
/// address administrators (type 2, 4-byte ASN, is not emitted here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteDistinguisherType {
    ASN,
    IP,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RouteDistinguisher {
    pub typ: RouteDistinguisherType,
    pub val: [u8; 6],
}

impl Default for RouteDistinguisherType {
    fn default() -> Self {
        RouteDistinguisherType::ASN
    }
}

impl RouteDistinguisher {
    pub fn asn(asn: u16, local: u32) -> Self {
        let mut val = [0u8; 6];
        val[0..2].copy_from_slice(&asn.to_be_bytes());
        val[2..6].copy_from_slice(&local.to_be_bytes());
        Self {
            typ: RouteDistinguisherType::ASN,
            val,
        }
    }

    pub fn ip(addr: Ipv4Addr, local: u16) -> Self {
        let mut val = [0u8; 6];
        val[0..4].copy_from_slice(&addr.octets());
        val[4..6].copy_from_slice(&local.to_be_bytes());
        Self {
            typ: RouteDistinguisherType::IP,
            val,
        }
    }

    pub fn parse_be(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, typ) = be_u16(input)?;
        let (input, bytes) = nom::bytes::complete::take(6usize)(input)?;
        let mut val = [0u8; 6];
        val.copy_from_slice(bytes);
        let typ = if typ == 0 {
            RouteDistinguisherType::ASN
        } else {
            RouteDistinguisherType::IP
        };
        Ok((input, RouteDistinguisher { typ, val }))
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        match self.typ {
            RouteDistinguisherType::ASN => buf.put_u16(0),
            RouteDistinguisherType::IP => buf.put_u16(1),
        }
        buf.put(&self.val[..]);
    }

    pub fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        match self.typ {
            RouteDistinguisherType::ASN => out[0..2].copy_from_slice(&0u16.to_be_bytes()),
            RouteDistinguisherType::IP => out[0..2].copy_from_slice(&1u16.to_be_bytes()),
        }
        out[2..8].copy_from_slice(&self.val);
        out
    }

    pub fn from_bytes(bytes: &[u8; 8]) -> Self {
        let typ = if u16::from_be_bytes([bytes[0], bytes[1]]) == 0 {
            RouteDistinguisherType::ASN
        } else {
            RouteDistinguisherType::IP
        };
        let mut val = [0u8; 6];
        val.copy_from_slice(&bytes[2..8]);
        Self { typ, val }
    }
}

impl fmt::Display for RouteDistinguisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            RouteDistinguisherType::ASN => {
                let asn = u16::from_be_bytes([self.val[0], self.val[1]]);
                let local = be_u32::<_, nom::error::Error<&[u8]>>(&self.val[2..6])
                    .map(|(_, v)| v)
                    .unwrap_or(0);
                write!(f, "{asn}:{local}")
            }
            RouteDistinguisherType::IP => {
                let addr = Ipv4Addr::new(self.val[0], self.val[1], self.val[2], self.val[3]);
                let local = u16::from_be_bytes([self.val[4], self.val[5]]);
                write!(f, "{addr}:{local}")
            }
        }
    }
}

impl fmt::Debug for RouteDistinguisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RouteDistinguisherParseError(pub String);

impl FromStr for RouteDistinguisher {
    type Err = RouteDistinguisherParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (admin, local) = s
            .rsplit_once(':')
            .ok_or_else(|| RouteDistinguisherParseError(s.to_string()))?;
        if let Ok(addr) = admin.parse::<Ipv4Addr>() {
            let local: u16 = local
                .parse()
                .map_err(|_| RouteDistinguisherParseError(s.to_string()))?;
            return Ok(RouteDistinguisher::ip(addr, local));
        }
        let asn: u16 = admin
            .parse()
            .map_err(|_| RouteDistinguisherParseError(s.to_string()))?;
        let local: u32 = local
            .parse()
            .map_err(|_| RouteDistinguisherParseError(s.to_string()))?;
        Ok(RouteDistinguisher::asn(asn, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asn_round_trip() {
        let rd = RouteDistinguisher::asn(100, 200);
        assert_eq!(rd.to_string(), "100:200");
        assert_eq!(RouteDistinguisher::from_str("100:200").unwrap(), rd);
    }

    #[test]
    fn ip_round_trip() {
        let rd = RouteDistinguisher::ip(Ipv4Addr::new(1, 2, 3, 4), 200);
        assert_eq!(rd.to_string(), "1.2.3.4:200");
        assert_eq!(RouteDistinguisher::from_str("1.2.3.4:200").unwrap(), rd);
    }

    #[test]
    fn wire_round_trip() {
        let rd = RouteDistinguisher::asn(7675, 42);
        let bytes = rd.to_bytes();
        assert_eq!(RouteDistinguisher::from_bytes(&bytes), rd);
    }
}
</content>
