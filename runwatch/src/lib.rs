//! Run status derivation for long-running agent runs.
//!
//! Each run is bound to a worktree and a tmux session and has several
//! independently updated, sometimes stale signals. This crate reconciles them
//! into one stable label per run. The architecture enforces a strict split:
//!
//! - **[`core`]**: Pure, deterministic logic (self-report contract, derivation
//!   precedence, stall heuristic). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (report and metadata files, config,
//!   tmux probes).
//!
//! Orchestration modules ([`snapshot`], [`status`], [`check`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod snapshot;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
