//! Shared deterministic types for status derivation.
//!
//! These types define stable contracts between the self-report reader, the
//! snapshot assembler and the derivation engine. They carry no I/O handles and
//! are rebuilt from scratch on every status check.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::report::RunnerReport;

/// Status a runner declares about itself in its self-report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportState {
    Working,
    NeedsInput,
    Blocked,
    ReadyForReview,
}

impl ReportState {
    pub const ALL: [ReportState; 4] = [
        ReportState::Working,
        ReportState::NeedsInput,
        ReportState::Blocked,
        ReportState::ReadyForReview,
    ];

    /// Value as written in the self-report file.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportState::Working => "working",
            ReportState::NeedsInput => "needs_input",
            ReportState::Blocked => "blocked",
            ReportState::ReadyForReview => "ready_for_review",
        }
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportState {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReportState::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| anyhow!("unknown runner status '{value}'"))
    }
}

/// Canonical, operator-facing status of a run.
///
/// The string labels are a released contract: renderers match on them
/// literally, so [`DerivedStatus::label`] is the only place they are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedStatus {
    Broken,
    Merged,
    Abandoned,
    Failed,
    NeedsAttention,
    ReadyForReview,
    NeedsInput,
    Blocked,
    Working,
    Stalled,
    Active,
    Idle,
}

impl DerivedStatus {
    pub const ALL: [DerivedStatus; 12] = [
        DerivedStatus::Broken,
        DerivedStatus::Merged,
        DerivedStatus::Abandoned,
        DerivedStatus::Failed,
        DerivedStatus::NeedsAttention,
        DerivedStatus::ReadyForReview,
        DerivedStatus::NeedsInput,
        DerivedStatus::Blocked,
        DerivedStatus::Working,
        DerivedStatus::Stalled,
        DerivedStatus::Active,
        DerivedStatus::Idle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DerivedStatus::Broken => "broken",
            DerivedStatus::Merged => "merged",
            DerivedStatus::Abandoned => "abandoned",
            DerivedStatus::Failed => "failed",
            DerivedStatus::NeedsAttention => "needs attention",
            DerivedStatus::ReadyForReview => "ready for review",
            DerivedStatus::NeedsInput => "needs input",
            DerivedStatus::Blocked => "blocked",
            DerivedStatus::Working => "working",
            DerivedStatus::Stalled => "stalled",
            DerivedStatus::Active => "active",
            DerivedStatus::Idle => "idle",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DerivedStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DerivedStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DerivedStatus::ALL
            .into_iter()
            .find(|status| status.label() == raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown derived status '{raw}'")))
    }
}

/// Verdict from the stall heuristic.
///
/// `is_stalled` is authoritative; `stalled_duration` is informational and may
/// be non-zero even when the run is not stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StallResult {
    pub is_stalled: bool,
    pub stalled_duration: Duration,
}

/// Locally observed signals for one run, gathered fresh on every check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Terminal session currently exists.
    pub tmux_active: bool,
    /// Worktree directory exists on disk.
    pub worktree_present: bool,
    /// Parsed self-report; `None` when missing or unusable this cycle.
    pub runner_status: Option<RunnerReport>,
    /// Stall verdict; `None` when not computed this cycle.
    pub stall_result: Option<StallResult>,
}

/// Output of [`crate::core::derive::derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Derived {
    #[serde(rename = "status")]
    pub derived_status: DerivedStatus,
    pub archived: bool,
}
