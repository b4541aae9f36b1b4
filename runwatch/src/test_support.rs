//! Test-only helpers for building run fixtures and scripted probes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::core::metadata::{Archive, Flags, RunMetadata};
use crate::core::report::RunnerReport;
use crate::core::types::{Snapshot, StallResult};
use crate::io::paths::RunPaths;
use crate::io::report_store::write_report;
use crate::snapshot::SessionProbe;

/// Temporary run directory laid out as `RunPaths` expects, with both
/// `.runner/state/` and `worktree/` created.
pub struct TestRun {
    dir: TempDir,
    worktree: PathBuf,
}

impl TestRun {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp run dir")?;
        let paths = RunPaths::new(dir.path());
        fs::create_dir_all(&paths.state_dir).context("create state dir")?;
        fs::create_dir_all(&paths.worktree_dir).context("create worktree dir")?;
        Ok(Self {
            worktree: paths.worktree_dir,
            dir,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// Delete the worktree the way the orchestrator does on archive.
    pub fn remove_worktree(&self) -> Result<()> {
        fs::remove_dir_all(&self.worktree).context("remove worktree")
    }

    pub fn paths(&self) -> RunPaths {
        RunPaths::new(self.root())
    }

    pub fn write_report(&self, report: &RunnerReport) -> Result<()> {
        write_report(self.root(), report)
    }

    pub fn write_raw_report(&self, contents: &str) -> Result<()> {
        fs::write(self.paths().report_path, contents).context("write raw report")
    }

    pub fn write_metadata(&self, meta: &RunMetadata) -> Result<()> {
        let buf = serde_json::to_string_pretty(meta).context("serialize metadata")?;
        self.write_raw_metadata(&buf)
    }

    pub fn write_raw_metadata(&self, contents: &str) -> Result<()> {
        fs::write(self.paths().metadata_path, contents).context("write raw metadata")
    }
}

/// Session probe with fixed answers. Errors are stored as strings so the
/// probe can be reused across calls.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    pub alive: std::result::Result<bool, String>,
    pub activity: std::result::Result<Option<DateTime<Utc>>, String>,
}

impl ScriptedProbe {
    pub fn alive(last_activity: Option<DateTime<Utc>>) -> Self {
        Self {
            alive: Ok(true),
            activity: Ok(last_activity),
        }
    }

    pub fn dead() -> Self {
        Self {
            alive: Ok(false),
            activity: Ok(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            alive: Err("no server running".to_string()),
            activity: Err("no server running".to_string()),
        }
    }
}

impl SessionProbe for ScriptedProbe {
    fn is_alive(&self, _session: &str) -> Result<bool> {
        self.alive.clone().map_err(|msg| anyhow!(msg))
    }

    fn last_activity(&self, _session: &str) -> Result<Option<DateTime<Utc>>> {
        self.activity.clone().map_err(|msg| anyhow!(msg))
    }
}

/// Metadata with a flags record and no archive record.
pub fn metadata_with_flags(abandoned: bool, setup_failed: bool, needs_attention: bool) -> RunMetadata {
    RunMetadata {
        archive: None,
        flags: Some(Flags {
            abandoned,
            setup_failed,
            needs_attention,
        }),
    }
}

/// Metadata for a merged run.
pub fn merged_metadata() -> RunMetadata {
    RunMetadata {
        archive: Some(Archive {
            merged_at: Some("2026-02-01T10:00:00Z".to_string()),
            archived_at: None,
        }),
        flags: None,
    }
}

/// Report with the given raw status and the fields that status requires.
pub fn report_with_status(status: &str) -> RunnerReport {
    RunnerReport {
        status: status.to_string(),
        summary: format!("{status} summary"),
        questions: vec!["Which endpoint?".to_string()],
        blockers: vec!["Missing token".to_string()],
        how_to_test: "cargo test".to_string(),
        ..RunnerReport::initial()
    }
}

/// Snapshot with a present worktree.
pub fn snapshot(
    tmux_active: bool,
    runner_status: Option<RunnerReport>,
    stall_result: Option<StallResult>,
) -> Snapshot {
    Snapshot {
        tmux_active,
        worktree_present: true,
        runner_status,
        stall_result,
    }
}
