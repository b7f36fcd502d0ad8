//! Per-family error counters (§7 user-visible behavior): each non-fatal
//! decode/apply error increments a counter rather than aborting the
//! session. Named after the family they're scoped to, mirroring the
//! `inet6_rx_bad_prefix_count`-style counters the spec calls out by
//! name.
//!
//! Grounded on the teacher's `BgpDebugFlags`-adjacent per-session
//! counter fields (`peer.rs`'s `stats` block): plain `u64` fields bumped
//! by a `record_*` method, read back by the (out-of-scope) management
//! RPC layer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default, Debug)]
pub struct FamilyCounters {
    pub rx_bad_prefix_count: AtomicU64,
    pub rx_bad_nexthop_count: AtomicU64,
    pub rx_bad_afi_safi_count: AtomicU64,
    pub rx_bad_xml_token_count: AtomicU64,
}

impl FamilyCounters {
    fn new() -> Self {
        Self::default()
    }

    pub fn record_bad_prefix(&self) {
        self.rx_bad_prefix_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad_nexthop(&self) {
        self.rx_bad_nexthop_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad_afi_safi(&self) {
        self.rx_bad_afi_safi_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad_xml_token(&self) {
        self.rx_bad_xml_token_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FamilyCounterSnapshot {
        FamilyCounterSnapshot {
            rx_bad_prefix_count: self.rx_bad_prefix_count.load(Ordering::Relaxed),
            rx_bad_nexthop_count: self.rx_bad_nexthop_count.load(Ordering::Relaxed),
            rx_bad_afi_safi_count: self.rx_bad_afi_safi_count.load(Ordering::Relaxed),
            rx_bad_xml_token_count: self.rx_bad_xml_token_count.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FamilyCounterSnapshot {
    pub rx_bad_prefix_count: u64,
    pub rx_bad_nexthop_count: u64,
    pub rx_bad_afi_safi_count: u64,
    pub rx_bad_xml_token_count: u64,
}

/// Per-peer, per-family counter table. Keyed by a caller-supplied label
/// (e.g. `"inet6"`, `"l3vpn"`) rather than `AfiSafi` directly so
/// operational tooling can name families the way operators already do.
#[derive(Default)]
pub struct CounterRegistry {
    by_family: HashMap<&'static str, FamilyCounters>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(&mut self, name: &'static str) -> &FamilyCounters {
        self.by_family.entry(name).or_insert_with(FamilyCounters::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_prefix_increments_the_named_family_counter() {
        let mut reg = CounterRegistry::new();
        reg.family("inet6").record_bad_prefix();
        reg.family("inet6").record_bad_prefix();
        reg.family("l3vpn").record_bad_prefix();

        assert_eq!(reg.family("inet6").snapshot().rx_bad_prefix_count, 2);
        assert_eq!(reg.family("l3vpn").snapshot().rx_bad_prefix_count, 1);
    }
}
