use std::net::IpAddr;

use bytes::{BufMut, BytesMut};

use crate::{Afi, AttrType, MvpnPrefix, Safi};

use super::{AttrEmitter, AttrFlags};

/// MP_REACH body for the mvpn (MCAST-VPN) family. `MvpnPrefix::to_wire`
/// already emits the full self-contained NLRI, mirroring
/// `ErmVpnReach`'s shape.
pub struct MvpnReach {
    pub snpa: u8,
    pub nhop: IpAddr,
    pub updates: Vec<MvpnPrefix>,
}

impl AttrEmitter for MvpnReach {
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
        buf.put_u8(u8::from(Safi::Mvpn));
        let octets = match self.nhop {
            IpAddr::V4(v4) => {
                buf.put_u8(4);
                v4.octets().to_vec()
            }
            IpAddr::V6(v6) => {
                buf.put_u8(16);
                v6.octets().to_vec()
            }
        };
        buf.put(&octets[..]);
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            update.to_wire(buf);
        }
    }
}
