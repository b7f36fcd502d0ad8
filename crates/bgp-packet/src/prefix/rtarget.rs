use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::bytes::complete::take;
use nom::number::complete::{be_u8, be_u32};

use crate::ExtCommunityValue;

use super::PrefixError;

/// RT-constrain route key (RFC 4684): `{origin AS, route target}`. Used
/// by the rtarget table to flood which peers are interested in which
/// route targets, so the replicator only leaks a VRF route toward peers
/// that actually imported its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RTargetPrefix {
    pub origin_as: u32,
    pub route_target: ExtCommunityValue,
}

impl RTargetPrefix {
    /// `{1-byte bit-length, 4-byte origin AS, 8-byte route target}`, or
    /// the zero-length default route-target prefix used to request
    /// "send me everything".
    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, bits) = be_u8(input)?;
        if bits == 0 {
            return Ok((
                input,
                RTargetPrefix {
                    origin_as: 0,
                    route_target: ExtCommunityValue::default(),
                },
            ));
        }
        if bits != 96 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        let (input, origin_as) = be_u32(input)?;
        let (input, high_type) = be_u8(input)?;
        let (input, low_type) = be_u8(input)?;
        let (input, val_bytes) = take(6usize)(input)?;
        let mut val = [0u8; 6];
        val.copy_from_slice(val_bytes);
        Ok((
            input,
            RTargetPrefix {
                origin_as,
                route_target: ExtCommunityValue {
                    high_type,
                    low_type,
                    val,
                },
            },
        ))
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        if self.origin_as == 0 && self.route_target == ExtCommunityValue::default() {
            buf.put_u8(0);
            return;
        }
        buf.put_u8(96);
        buf.put_u32(self.origin_as);
        self.route_target.encode(buf);
    }
}

impl FromStr for RTargetPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (as_part, rt_part) = s.split_once(':').ok_or_else(|| PrefixError(s.to_string()))?;
        let origin_as: u32 = as_part.parse().map_err(|_| PrefixError(s.to_string()))?;
        let mut val = [0u8; 6];
        let (a, b) = rt_part.split_once(':').ok_or_else(|| PrefixError(s.to_string()))?;
        let asn: u16 = a.parse().map_err(|_| PrefixError(s.to_string()))?;
        let local: u32 = b.parse().map_err(|_| PrefixError(s.to_string()))?;
        val[0..2].copy_from_slice(&asn.to_be_bytes());
        val[2..6].copy_from_slice(&local.to_be_bytes());
        Ok(RTargetPrefix {
            origin_as,
            route_target: ExtCommunityValue {
                high_type: 0x00,
                low_type: 0x02,
                val,
            },
        })
    }
}

impl fmt::Display for RTargetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin_as, self.route_target)
    }
}

impl PartialOrd for RTargetPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RTargetPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        self.origin_as
            .cmp(&other.origin_as)
            .then(self.route_target.cmp(&other.route_target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        let p = RTargetPrefix::from_str("100:200:300").unwrap();
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = RTargetPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }

    #[test]
    fn zero_length_is_default_rt() {
        let mut buf = BytesMut::new();
        buf.put_u8(0);
        let (rest, decoded) = RTargetPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded.origin_as, 0);
    }
}
