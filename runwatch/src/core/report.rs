//! Runner self-report contract.
//!
//! A runner overwrites its self-report wholesale at every milestone; the
//! watcher only reads it. Parsing is lenient (missing fields default to empty)
//! so that a half-written report still loads, and [`validate_report`] is the
//! separate, strict check for semantic validity.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::types::ReportState;

/// Schema version written by [`RunnerReport::initial`].
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Summary written by a freshly started runner.
pub const INITIAL_SUMMARY: &str = "Starting work";

/// Self-report written by a runner process (`.runner/state/status.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerReport {
    /// Semantic version of the report layout. Not checked beyond presence.
    pub schema_version: String,
    /// Raw status value; see [`RunnerReport::state`] for the parsed form.
    pub status: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
    pub summary: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub questions: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub blockers: Vec<String>,
    pub how_to_test: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub risks: Vec<String>,
}

impl RunnerReport {
    /// Minimal valid report for a runner that just started.
    pub fn initial() -> Self {
        Self::initial_at(Utc::now())
    }

    pub fn initial_at(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            status: ReportState::Working.as_str().to_string(),
            updated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            summary: INITIAL_SUMMARY.to_string(),
            questions: Vec::new(),
            blockers: Vec::new(),
            how_to_test: String::new(),
            risks: Vec::new(),
        }
    }

    /// Parsed status, or `None` when empty or unrecognized.
    pub fn state(&self) -> Option<ReportState> {
        self.status.parse().ok()
    }

    /// Parsed `updated_at`, or `None` when empty or malformed.
    pub fn updated_at_time(&self) -> Option<DateTime<Utc>> {
        if self.updated_at.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Check required fields for the declared status.
    pub fn validate(&self) -> Result<()> {
        if self.status.is_empty() {
            bail!("status must be non-empty");
        }
        let state = self.state().ok_or_else(|| {
            anyhow!(
                "status '{}' is not one of working, needs_input, blocked, ready_for_review",
                self.status
            )
        })?;
        if self.summary.is_empty() {
            bail!("summary must be non-empty");
        }
        match state {
            ReportState::NeedsInput if self.questions.is_empty() => {
                bail!("questions must be non-empty when status=needs_input")
            }
            ReportState::Blocked if self.blockers.is_empty() => {
                bail!("blockers must be non-empty when status=blocked")
            }
            ReportState::ReadyForReview if self.how_to_test.is_empty() => {
                bail!("how_to_test must be non-empty when status=ready_for_review")
            }
            _ => Ok(()),
        }
    }
}

/// Validate an optional report; an absent report is invalid.
pub fn validate_report(report: Option<&RunnerReport>) -> Result<()> {
    match report {
        Some(report) => report.validate(),
        None => bail!("runner status report is missing"),
    }
}

/// Wall-clock time since the report's `updated_at`.
///
/// Best effort: zero when the report is absent or the timestamp is empty,
/// malformed, or in the future.
pub fn report_age(report: Option<&RunnerReport>) -> Duration {
    report_age_at(report, Utc::now())
}

pub fn report_age_at(report: Option<&RunnerReport>, now: DateTime<Utc>) -> Duration {
    report
        .and_then(RunnerReport::updated_at_time)
        .and_then(|updated_at| (now - updated_at).to_std().ok())
        .unwrap_or(Duration::ZERO)
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
