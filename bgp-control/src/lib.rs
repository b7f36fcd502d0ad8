//! BGP control-plane routing engine: codec-fed RIB, attribute
//! interning, route-target replication, and update scheduling (see
//! `SPEC_FULL.md` at the workspace root for the full requirements this
//! crate implements).
//!
//! The wire codec lives in the sibling `bgp-packet` crate; this crate
//! is everything downstream of a decoded message — the attribute
//! interning database (§4.C), the RIB (§4.D), the route-target
//! replicator (§4.E), and the update scheduler (§4.F/§4.G/§4.H) — tied
//! together by the `BgpServer` context struct.

pub mod attr_db;
pub mod config;
pub mod counters;
pub mod error;
pub mod replicator;
pub mod rib;
pub mod rtarget;
pub mod scheduler;
pub mod server;
pub mod task;
pub mod tracing;

pub use server::BgpServer;
