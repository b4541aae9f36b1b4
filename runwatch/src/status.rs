//! Orchestration for `runwatch status`.
//!
//! Loads the run's metadata, assembles a fresh snapshot and derives the
//! operator-facing status. Results are never cached: every call re-reads all
//! inputs.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::core::derive::derive_status;
use crate::core::metadata::RunMetadata;
use crate::core::report::report_age_at;
use crate::core::types::{Derived, DerivedStatus};
use crate::io::metadata::load_metadata;
use crate::snapshot::{SessionProbe, SnapshotRequest, assemble_snapshot};

/// Derived status plus the self-report details renderers show alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatusView {
    #[serde(flatten)]
    pub derived: Derived,
    /// Self-report summary, when a usable report was read.
    pub summary: Option<String>,
    /// Whole seconds since the self-report's `updated_at`.
    #[serde(rename = "report_age_secs", serialize_with = "as_secs")]
    pub report_age: Option<Duration>,
}

impl RunStatusView {
    pub fn status(&self) -> DerivedStatus {
        self.derived.derived_status
    }

    /// One-line human rendering, e.g. `blocked (archived)`.
    pub fn render_line(&self) -> String {
        let mut line = self.derived.derived_status.label().to_string();
        if self.derived.archived {
            line.push_str(" (archived)");
        }
        if let Some(summary) = &self.summary {
            line.push_str(" - ");
            line.push_str(summary);
        }
        line
    }
}

/// Evaluate one run end to end. Never fails; unreadable metadata derives `broken`.
#[instrument(skip_all, fields(run_dir = %request.run_dir.display()))]
pub fn evaluate_run(
    request: &SnapshotRequest<'_>,
    metadata_path: &Path,
    probe: &dyn SessionProbe,
) -> RunStatusView {
    let metadata = read_metadata(metadata_path);
    let snapshot = assemble_snapshot(request, probe);
    let derived = derive_status(metadata.as_ref(), &snapshot);
    info!(
        status = derived.derived_status.label(),
        archived = derived.archived,
        "run status derived"
    );

    let report = snapshot.runner_status.as_ref();
    RunStatusView {
        derived,
        summary: report.map(|r| r.summary.clone()).filter(|s| !s.is_empty()),
        report_age: report.map(|r| report_age_at(Some(r), request.now)),
    }
}

fn read_metadata(path: &Path) -> Option<RunMetadata> {
    match load_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            warn!(path = %path.display(), err = %format!("{err:#}"), "run metadata unreadable");
            None
        }
    }
}

fn as_secs<S: serde::Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_some(&duration.as_secs()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::RunnerReport;
    use crate::snapshot::ReportPolicy;
    use crate::test_support::{ScriptedProbe, TestRun, metadata_with_flags};
    use chrono::{TimeDelta, Utc};

    fn request(run: &TestRun) -> SnapshotRequest<'_> {
        SnapshotRequest {
            run_dir: run.root(),
            worktree: run.worktree(),
            session: Some("run-1"),
            stall_threshold: Duration::from_secs(600),
            report_policy: ReportPolicy::Strict,
            now: Utc::now(),
        }
    }

    #[test]
    fn missing_metadata_renders_broken() {
        let run = TestRun::new().expect("run");
        let view = evaluate_run(
            &request(&run),
            &run.paths().metadata_path,
            &ScriptedProbe::alive(None),
        );
        assert_eq!(view.status(), DerivedStatus::Broken);
        assert!(!view.derived.archived);
        assert_eq!(view.render_line(), "broken");
    }

    #[test]
    fn malformed_metadata_renders_broken() {
        let run = TestRun::new().expect("run");
        run.write_raw_metadata("[]").expect("write");
        let view = evaluate_run(
            &request(&run),
            &run.paths().metadata_path,
            &ScriptedProbe::alive(None),
        );
        assert_eq!(view.status(), DerivedStatus::Broken);
    }

    #[test]
    fn report_summary_and_age_are_surfaced() {
        let run = TestRun::new().expect("run");
        run.write_metadata(&metadata_with_flags(false, false, false))
            .expect("write meta");
        let req = request(&run);
        let report = RunnerReport {
            status: "blocked".to_string(),
            summary: "waiting on API keys".to_string(),
            blockers: vec!["no staging credentials".to_string()],
            updated_at: (req.now - TimeDelta::minutes(3)).to_rfc3339(),
            ..RunnerReport::initial()
        };
        run.write_report(&report).expect("write report");

        let view = evaluate_run(&req, &run.paths().metadata_path, &ScriptedProbe::alive(None));
        assert_eq!(view.status(), DerivedStatus::Blocked);
        assert_eq!(view.summary.as_deref(), Some("waiting on API keys"));
        assert_eq!(view.report_age, Some(Duration::from_secs(180)));
        assert_eq!(view.render_line(), "blocked - waiting on API keys");
    }

    #[test]
    fn view_serializes_flat() {
        let view = RunStatusView {
            derived: Derived {
                derived_status: DerivedStatus::ReadyForReview,
                archived: true,
            },
            summary: Some("done".to_string()),
            report_age: Some(Duration::from_millis(61_500)),
        };
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "status": "ready for review",
                "archived": true,
                "summary": "done",
                "report_age_secs": 61,
            })
        );
    }
}
