//! Update scheduler: RibOuts, SchedulingGroups, the per-group work
//! queue, and peer membership (§4.F, §4.G).

pub mod group;
pub mod membership;
pub mod message_builder;
pub mod peer_channel;
pub mod ribout;
pub mod workqueue;

pub use group::{GroupId, SchedulingGroup, SchedulingGroupManager, SPLIT_THRESHOLD};
pub use membership::PeerMembership;
pub use message_builder::{
    Announce, pack_ermvpn_updates, pack_evpn_updates, pack_inet6_updates, pack_inet6vpn_updates,
    pack_inet_updates, pack_inetvpn_updates, pack_mvpn_updates,
};
pub use peer_channel::PeerChannel;
pub use ribout::{Encoding, PeerId, RibOut, RibOutId, RibOutPolicy, SessionType};
pub use workqueue::{QueueId, WorkItemKind, WorkQueue};

/// The four calls the session layer exposes to the core (§6): modeled
/// as a trait so unit tests can drive the scheduler against an
/// in-memory fake instead of a real socket.
pub trait PeerSink: Send {
    /// Delivers an encoded message. `false` means the peer is blocked;
    /// the core expects a future `send_ready` before retrying.
    fn send_update(&mut self, bytes: &[u8]) -> bool;
    fn close(&mut self);
}

#[cfg(test)]
pub struct FakeSink {
    pub sent: Vec<Vec<u8>>,
    pub blocked: bool,
    pub closed: bool,
}

#[cfg(test)]
impl FakeSink {
    pub fn new() -> Self {
        FakeSink { sent: Vec::new(), blocked: false, closed: false }
    }
}

#[cfg(test)]
impl PeerSink for FakeSink {
    fn send_update(&mut self, bytes: &[u8]) -> bool {
        if self.blocked {
            return false;
        }
        self.sent.push(bytes.to_vec());
        true
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_sink_reports_blocked_state_honestly() {
        let mut sink = FakeSink::new();
        assert!(sink.send_update(b"hello"));
        sink.blocked = true;
        assert!(!sink.send_update(b"world"));
        assert_eq!(sink.sent, vec![b"hello".to_vec()]);
    }
}
