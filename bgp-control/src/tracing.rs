//! Control-plane tracing macros that automatically include proto="bgp".
//!
//! Mirrors the convenience macros used throughout the daemon's other
//! protocol tasks: every event carries a `proto` field so an operator can
//! filter a shared log stream down to one subsystem.

#[macro_export]
macro_rules! bgp_info {
    ($($arg:tt)*) => {
        tracing::info!(proto = "bgp", $($arg)*)
    };
}

#[macro_export]
macro_rules! bgp_warn {
    ($($arg:tt)*) => {
        tracing::warn!(proto = "bgp", $($arg)*)
    };
}

#[macro_export]
macro_rules! bgp_error {
    ($($arg:tt)*) => {
        tracing::error!(proto = "bgp", $($arg)*)
    };
}

#[macro_export]
macro_rules! bgp_debug {
    ($($arg:tt)*) => {
        tracing::debug!(proto = "bgp", $($arg)*)
    };
}

#[macro_export]
macro_rules! bgp_trace {
    ($($arg:tt)*) => {
        tracing::trace!(proto = "bgp", $($arg)*)
    };
}

/// Builds the process-wide subscriber: JSON-formatted, non-blocking file
/// output via `tracing-appender`, level filter from `RUST_LOG`/`BGP_LOG`.
pub fn init_subscriber(log_dir: &str, file_prefix: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_env("BGP_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .init();

    guard
}
