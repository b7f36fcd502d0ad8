use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use nom::IResult;
use nom::bytes::complete::take;
use nom::error::{ErrorKind, make_error};
use nom::number::complete::{be_u8, be_u24, be_u32};

use crate::RouteDistinguisher;

use super::PrefixError;

/// Routing key for the two EVPN route types the RIB tables care about:
/// MAC/IP advertisement (type 2) and inclusive multicast Ethernet tag
/// (type 3). Wire form is `{1-byte type, 1-byte length, type body}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvpnPrefix {
    Mac {
        rd: RouteDistinguisher,
        ether_tag: u32,
        mac: [u8; 6],
        ip: Option<IpAddr>,
    },
    Multicast {
        rd: RouteDistinguisher,
        ether_tag: u32,
        origin: IpAddr,
    },
}

impl EvpnPrefix {
    pub fn rd(&self) -> &RouteDistinguisher {
        match self {
            EvpnPrefix::Mac { rd, .. } => rd,
            EvpnPrefix::Multicast { rd, .. } => rd,
        }
    }

    pub fn from_wire(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, route_type) = be_u8(input)?;
        let (input, _length) = be_u8(input)?;
        match route_type {
            2 => {
                let (input, rd) = RouteDistinguisher::parse_be(input)?;
                let (input, _esi) = take(10usize)(input)?;
                let (input, ether_tag) = be_u32(input)?;
                let (input, mac_bits) = be_u8(input)?;
                if mac_bits != 48 {
                    return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue)));
                }
                let (input, mac_bytes) = take(6usize)(input)?;
                let mut mac = [0u8; 6];
                mac.copy_from_slice(mac_bytes);
                let (input, ip_bits) = be_u8(input)?;
                let (input, ip) = match ip_bits {
                    0 => (input, None),
                    32 => {
                        let (input, v) = be_u32(input)?;
                        (input, Some(IpAddr::from(std::net::Ipv4Addr::from(v))))
                    }
                    128 => {
                        let (input, v) = take(16usize)(input)?;
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(v);
                        (input, Some(IpAddr::from(std::net::Ipv6Addr::from(octets))))
                    }
                    _ => return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue))),
                };
                let (input, _label) = be_u24(input)?;
                Ok((
                    input,
                    EvpnPrefix::Mac {
                        rd,
                        ether_tag,
                        mac,
                        ip,
                    },
                ))
            }
            3 => {
                let (input, rd) = RouteDistinguisher::parse_be(input)?;
                let (input, ether_tag) = be_u32(input)?;
                let (input, addr_bits) = be_u8(input)?;
                let (input, origin) = match addr_bits {
                    32 => {
                        let (input, v) = be_u32(input)?;
                        (input, IpAddr::from(std::net::Ipv4Addr::from(v)))
                    }
                    128 => {
                        let (input, v) = take(16usize)(input)?;
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(v);
                        (input, IpAddr::from(std::net::Ipv6Addr::from(octets)))
                    }
                    _ => return Err(nom::Err::Error(make_error(input, ErrorKind::LengthValue))),
                };
                Ok((
                    input,
                    EvpnPrefix::Multicast {
                        rd,
                        ether_tag,
                        origin,
                    },
                ))
            }
            _ => Err(nom::Err::Error(make_error(input, ErrorKind::NoneOf))),
        }
    }

    pub fn to_wire(&self, buf: &mut BytesMut) {
        let mut body = BytesMut::new();
        let route_type: u8 = match self {
            EvpnPrefix::Mac { .. } => 2,
            EvpnPrefix::Multicast { .. } => 3,
        };
        match self {
            EvpnPrefix::Mac {
                rd,
                ether_tag,
                mac,
                ip,
            } => {
                rd.encode(&mut body);
                body.put(&[0u8; 10][..]);
                body.put_u32(*ether_tag);
                body.put_u8(48);
                body.put(&mac[..]);
                match ip {
                    None => body.put_u8(0),
                    Some(IpAddr::V4(v4)) => {
                        body.put_u8(32);
                        body.put(&v4.octets()[..]);
                    }
                    Some(IpAddr::V6(v6)) => {
                        body.put_u8(128);
                        body.put(&v6.octets()[..]);
                    }
                }
                body.put(&[0u8; 3][..]); // label, carried on the path
            }
            EvpnPrefix::Multicast {
                rd,
                ether_tag,
                origin,
            } => {
                rd.encode(&mut body);
                body.put_u32(*ether_tag);
                match origin {
                    IpAddr::V4(v4) => {
                        body.put_u8(32);
                        body.put(&v4.octets()[..]);
                    }
                    IpAddr::V6(v6) => {
                        body.put_u8(128);
                        body.put(&v6.octets()[..]);
                    }
                }
            }
        }
        buf.put_u8(route_type);
        buf.put_u8(body.len() as u8);
        buf.put(body);
    }
}

impl FromStr for EvpnPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `rd/ether_tag/aa:bb:cc:dd:ee:ff[,ip]` for MAC routes,
        // `rd/ether_tag/origin` for inclusive-multicast routes. `/`
        // rather than `:` separates fields since the RD itself is
        // colon-separated (asn:local or ip:local).
        let mut parts = s.splitn(3, '/');
        let rd_part = parts.next().ok_or_else(|| PrefixError(s.to_string()))?;
        let tag_part = parts.next().ok_or_else(|| PrefixError(s.to_string()))?;
        let rest = parts.next().ok_or_else(|| PrefixError(s.to_string()))?;
        let rd = RouteDistinguisher::from_str(rd_part).map_err(|_| PrefixError(s.to_string()))?;
        let ether_tag: u32 = tag_part.parse().map_err(|_| PrefixError(s.to_string()))?;
        if let Ok(origin) = rest.parse::<IpAddr>() {
            return Ok(EvpnPrefix::Multicast {
                rd,
                ether_tag,
                origin,
            });
        }
        let (mac_part, ip_part) = rest.split_once(',').unwrap_or((rest, ""));
        let mac = parse_mac(mac_part).ok_or_else(|| PrefixError(s.to_string()))?;
        let ip = if ip_part.is_empty() {
            None
        } else {
            Some(
                ip_part
                    .parse::<IpAddr>()
                    .map_err(|_| PrefixError(s.to_string()))?,
            )
        };
        Ok(EvpnPrefix::Mac {
            rd,
            ether_tag,
            mac,
            ip,
        })
    }
}

fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return None;
    }
    for (i, p) in parts.iter().enumerate() {
        mac[i] = u8::from_str_radix(p, 16).ok()?;
    }
    Some(mac)
}

impl fmt::Display for EvpnPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvpnPrefix::Mac {
                rd,
                ether_tag,
                mac,
                ip,
            } => {
                let mac_str = mac
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(":");
                match ip {
                    Some(ip) => write!(f, "{rd}/{ether_tag}/{mac_str},{ip}"),
                    None => write!(f, "{rd}/{ether_tag}/{mac_str}"),
                }
            }
            EvpnPrefix::Multicast {
                rd,
                ether_tag,
                origin,
            } => write!(f, "{rd}/{ether_tag}/{origin}"),
        }
    }
}

impl PartialOrd for EvpnPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EvpnPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        fn key(p: &EvpnPrefix) -> (RouteDistinguisher, u32, u8) {
            match p {
                EvpnPrefix::Mac { rd, ether_tag, .. } => (*rd, *ether_tag, 2),
                EvpnPrefix::Multicast { rd, ether_tag, .. } => (*rd, *ether_tag, 3),
            }
        }
        key(self).cmp(&key(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_wire_round_trip() {
        let p = EvpnPrefix::Mac {
            rd: RouteDistinguisher::asn(100, 1),
            ether_tag: 0,
            mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            ip: None,
        };
        let mut buf = BytesMut::new();
        p.to_wire(&mut buf);
        let (rest, decoded) = EvpnPrefix::from_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, p);
    }

    #[test]
    fn mac_text_round_trip() {
        let p = EvpnPrefix::from_str("100:1/0/00:11:22:33:44:55").unwrap();
        assert_eq!(p.to_string(), "100:1/0/00:11:22:33:44:55");
    }
}
