//! Diagnostic tracing for the watcher.
//!
//! Tracing output goes to stderr and is controlled by `RUST_LOG`. It is never
//! part of command output: `runwatch status` prints its label on stdout so
//! scripts can match on it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn` so degraded inputs (unreadable
/// reports, failed session probes) are visible without extra flags.
///
/// # Example
/// ```bash
/// RUST_LOG=runwatch=debug runwatch status ./worktrees/run-42 --session run-42
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
