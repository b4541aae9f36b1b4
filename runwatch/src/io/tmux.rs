//! Tmux adapter for session liveness probes.
//!
//! Only read-only queries live here; creating and killing sessions belongs to
//! the orchestrator.

use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::io::config::TmuxConfig;
use crate::io::process::{ProbeOutput, run_probe};

/// Wrapper for read-only tmux queries.
#[derive(Debug, Clone)]
pub struct Tmux {
    binary: String,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl Tmux {
    pub fn new(config: &TmuxConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        }
    }

    /// True if a session with exactly this name exists.
    ///
    /// A missing tmux server counts as "no session".
    #[instrument(skip_all, fields(session))]
    pub fn has_session(&self, session: &str) -> Result<bool> {
        let target = format!("={session}");
        let out = self.run(&["has-session", "-t", &target])?;
        if out.timed_out {
            return Err(anyhow!("tmux has-session -t {target} timed out"));
        }
        let alive = out.status.success();
        debug!(session, alive, "tmux session probe");
        Ok(alive)
    }

    /// Time of the session's last activity, if tmux reports one.
    #[instrument(skip_all, fields(session))]
    pub fn session_activity(&self, session: &str) -> Result<Option<DateTime<Utc>>> {
        let target = format!("={session}:");
        let out = self.run(&["display-message", "-p", "-t", &target, "#{session_activity}"])?;
        if !out.success() {
            return Err(anyhow!(
                "tmux display-message -t {target} failed: {}",
                out.stderr.trim()
            ));
        }
        Ok(parse_activity(&out.stdout))
    }

    fn run(&self, args: &[&str]) -> Result<ProbeOutput> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        run_probe(cmd, self.timeout, self.output_limit_bytes)
            .map_err(|err| err.context(format!("{} {}", self.binary, args.join(" "))))
    }
}

/// Parse tmux's `#{session_activity}` (unix seconds).
fn parse_activity(stdout: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = stdout.trim().parse().ok()?;
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
