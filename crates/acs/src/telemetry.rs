//! Process-wide `tracing` subscriber setup for embedders that want the same
//! logging shape the teacher workspace's binaries use, without pulling in a
//! full telemetry stack of their own.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber that reads its filter from
/// `RUST_LOG` (falling back to `info`) and emits human-readable lines.
/// Should be called once, near process start, before constructing an
/// [`crate::AccessControlSystem`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Same as [`init_tracing`] but emits structured JSON lines, for deployments
/// that ship logs to a collector rather than a terminal.
pub fn init_tracing_json() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();
}
