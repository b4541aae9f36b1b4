//! Snapshot assembly for one status check.
//!
//! The [`SessionProbe`] trait decouples snapshot assembly from the terminal
//! multiplexer (currently tmux). Tests use scripted probes that return
//! predetermined answers without spawning processes.
//!
//! Assembly never fails: each signal that cannot be read this cycle degrades
//! to its "unknown" value and is logged, so one broken run cannot stop a
//! polling loop over many runs.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::core::report::RunnerReport;
use crate::core::stall::detect_stall;
use crate::core::types::{Snapshot, StallResult};
use crate::io::report_store::load_report;
use crate::io::tmux::Tmux;

/// Read-only view of a run's terminal session.
pub trait SessionProbe {
    /// True if the session currently exists.
    fn is_alive(&self, session: &str) -> Result<bool>;
    /// Last input/output activity in the session, if known.
    fn last_activity(&self, session: &str) -> Result<Option<DateTime<Utc>>>;
}

impl SessionProbe for Tmux {
    fn is_alive(&self, session: &str) -> Result<bool> {
        self.has_session(session)
    }

    fn last_activity(&self, session: &str) -> Result<Option<DateTime<Utc>>> {
        self.session_activity(session)
    }
}

/// How to treat a self-report that parses but fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPolicy {
    /// Invalid reports are dropped (treated as absent).
    Strict,
    /// Invalid reports are passed through; unknown statuses still fall through.
    Lenient,
}

/// Inputs for assembling one run's snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotRequest<'a> {
    /// Run directory holding `.runner/state/`.
    pub run_dir: &'a Path,
    /// Worktree checkout; its absence marks the run archived.
    pub worktree: &'a Path,
    /// Terminal session name, or `None` when the run has no session.
    pub session: Option<&'a str>,
    pub stall_threshold: Duration,
    pub report_policy: ReportPolicy,
    pub now: DateTime<Utc>,
}

/// Gather worktree, session, self-report and stall signals into a [`Snapshot`].
#[instrument(
    skip_all,
    fields(run_dir = %request.run_dir.display(), worktree = %request.worktree.display(), session = ?request.session)
)]
pub fn assemble_snapshot(request: &SnapshotRequest<'_>, probe: &dyn SessionProbe) -> Snapshot {
    let worktree_present = request.worktree.is_dir();
    let tmux_active = match request.session {
        Some(session) => session_alive(probe, session),
        None => false,
    };
    let stall_result = match request.session {
        Some(session) if tmux_active => stall_verdict(probe, session, request),
        _ => None,
    };
    let runner_status = usable_report(request.run_dir, request.report_policy);

    debug!(
        worktree_present,
        tmux_active,
        has_report = runner_status.is_some(),
        stalled = ?stall_result.map(|stall| stall.is_stalled),
        "snapshot assembled"
    );
    Snapshot {
        tmux_active,
        worktree_present,
        runner_status,
        stall_result,
    }
}

fn session_alive(probe: &dyn SessionProbe, session: &str) -> bool {
    match probe.is_alive(session) {
        Ok(alive) => alive,
        Err(err) => {
            warn!(session, err = %format!("{err:#}"), "session probe failed; treating as inactive");
            false
        }
    }
}

fn stall_verdict(
    probe: &dyn SessionProbe,
    session: &str,
    request: &SnapshotRequest<'_>,
) -> Option<StallResult> {
    match probe.last_activity(session) {
        Ok(last_activity) => detect_stall(last_activity, request.now, request.stall_threshold),
        Err(err) => {
            warn!(session, err = %format!("{err:#}"), "activity probe failed; skipping stall check");
            None
        }
    }
}

fn usable_report(run_dir: &Path, policy: ReportPolicy) -> Option<RunnerReport> {
    let report = match load_report(run_dir) {
        Ok(report) => report?,
        Err(err) => {
            warn!(err = %format!("{err:#}"), "runner report unreadable; ignoring this cycle");
            return None;
        }
    };
    if let Err(err) = report.validate() {
        match policy {
            ReportPolicy::Strict => {
                warn!(err = %err, "runner report invalid; ignoring this cycle");
                return None;
            }
            ReportPolicy::Lenient => debug!(err = %err, "runner report invalid; using anyway"),
        }
    }
    Some(report)
}
