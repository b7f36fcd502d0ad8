use std::net::IpAddr;

use bytes::{BufMut, BytesMut};

use crate::{Afi, AttrType, ErmVpnPrefix, Safi};

use super::{AttrEmitter, AttrFlags};

/// MP_REACH body for the ermvpn family. `ErmVpnPrefix::to_wire` already
/// emits the full self-contained NLRI (type, RD, router-id, group,
/// source), so no separate NLRI wrapper is needed the way inet/inet-vpn
/// need one for add-path IDs.
pub struct ErmVpnReach {
    pub snpa: u8,
    pub nhop: IpAddr,
    pub updates: Vec<ErmVpnPrefix>,
}

impl AttrEmitter for ErmVpnReach {
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
        buf.put_u8(u8::from(Safi::ErmVpn));
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
