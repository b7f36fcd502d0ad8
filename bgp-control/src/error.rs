//! Typed error taxonomy for the control-plane engine.
//!
//! One `thiserror` enum per subsystem, matching the way `bgp-packet`'s
//! `BgpParseError` reads: the RFC-level *kind* taxonomy lives in doc
//! comments on the variants rather than as separate marker types. Only
//! internal invariant violations (attribute-DB inconsistency, best-path
//! selection on an empty path list) use `assert!`/`unreachable!` — those
//! are bugs, not recoverable conditions, and are never wrapped in `Result`.

use bgp_packet::error::BgpParseError;
use thiserror::Error;

/// Errors raised while interning or releasing an attribute sub-object.
#[derive(Error, Debug)]
pub enum AttrDbError {
    /// `ReplaceXAndLocate` was asked to replace a field on a spec that
    /// cannot represent it (e.g. source-rd on a non-VPN attribute).
    #[error("attribute field {field} cannot be replaced on this spec")]
    UnsupportedReplace { field: &'static str },
}

/// Errors raised by table/route/path operations. Per §7, these are the
/// "policy" class: logged and the offending request is dropped, never
/// propagated as a session-fatal condition.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("no such routing instance: {0}")]
    UnknownInstance(String),

    #[error("route target string is not parseable: {0}")]
    BadRouteTarget(String),

    #[error("prefix family mismatch: table is {table_family}, path is {path_family}")]
    FamilyMismatch {
        table_family: &'static str,
        path_family: &'static str,
    },
}

/// Errors raised while registering/unregistering peers or draining the
/// per-group work queue.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("peer {0} is not registered to this RibOut")]
    PeerNotRegistered(u32),

    #[error("ribout capacity exhausted: more than {0} peers would require a wider bitset")]
    RibOutFull(usize),
}

/// Errors raised while applying a `ConfigDelta` to the routing-instance
/// graph. Policy-class per §7: the delta is dropped and the reason
/// logged, the daemon keeps running.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("routing instance {0} already exists")]
    InstanceExists(String),

    #[error("routing instance {0} does not exist")]
    InstanceMissing(String),

    #[error("invalid route target in instance {instance}: {target}")]
    InvalidRouteTarget { instance: String, target: String },

    #[error("invalid virtual network name: {0}")]
    InvalidVirtualNetworkName(String),
}

/// Session-fatal errors surfaced back up to the (out-of-scope) session
/// layer as a NOTIFICATION carrying `{code, subcode, data}`. The codec's
/// own `BgpParseError` is wrapped rather than duplicated — its
/// `AttribFlagsError`/`UnrecognizedWellKnownAttrib` variants already carry
/// the attribute type, offset, and length §7/§8 require in the report.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("decode failed: {0}")]
    Decode(#[from] BgpParseError),
}
