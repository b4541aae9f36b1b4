//! Strict self-report checking for `runwatch report check`.
//!
//! Runs both layers a strict caller needs: the structural schema check on the
//! raw document and the per-status required-field validation.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::core::report::RunnerReport;
use crate::io::paths::RunPaths;
use crate::io::report_store::{read_if_present, schema_violations};

/// Outcome of checking a run's self-report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCheck {
    /// No self-report has been written yet.
    Missing,
    /// The report exists but violates the schema or field rules.
    Invalid(Vec<String>),
    Valid(RunnerReport),
}

/// Check the self-report of the run directory `run_dir`.
///
/// Only filesystem errors other than "not found" are returned as `Err`.
pub fn check_report(run_dir: &Path) -> Result<ReportCheck> {
    let path = RunPaths::new(run_dir).report_path;
    let Some(raw) = read_if_present(&path)? else {
        return Ok(ReportCheck::Missing);
    };

    let mut problems = match schema_violations(&raw) {
        Ok(violations) => violations,
        Err(err) => return Ok(ReportCheck::Invalid(vec![format!("{err:#}")])),
    };
    let report: RunnerReport = match serde_json::from_str(&raw) {
        Ok(report) => report,
        Err(err) => {
            problems.push(format!("parse runner report: {err}"));
            return Ok(ReportCheck::Invalid(problems));
        }
    };
    if let Err(err) = report.validate() {
        let message = err.to_string();
        if !problems.contains(&message) {
            problems.push(message);
        }
    }

    debug!(problems = problems.len(), "runner report checked");
    if problems.is_empty() {
        Ok(ReportCheck::Valid(report))
    } else {
        Ok(ReportCheck::Invalid(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRun;

    #[test]
    fn missing_report() {
        let run = TestRun::new().expect("run");
        assert_eq!(check_report(run.root()).expect("check"), ReportCheck::Missing);
    }

    #[test]
    fn initial_report_is_valid() {
        let run = TestRun::new().expect("run");
        let report = RunnerReport::initial();
        run.write_report(&report).expect("write");
        assert_eq!(
            check_report(run.root()).expect("check"),
            ReportCheck::Valid(report)
        );
    }

    #[test]
    fn field_rule_violation_is_reported() {
        let run = TestRun::new().expect("run");
        run.write_report(&RunnerReport {
            status: "ready_for_review".to_string(),
            ..RunnerReport::initial()
        })
        .expect("write");

        let ReportCheck::Invalid(problems) = check_report(run.root()).expect("check") else {
            panic!("expected invalid report");
        };
        assert_eq!(
            problems,
            vec!["how_to_test must be non-empty when status=ready_for_review".to_string()]
        );
    }

    #[test]
    fn schema_and_parse_failures_are_reported() {
        let run = TestRun::new().expect("run");
        run.write_raw_report(r#"{"status":"shipping"}"#).expect("write");
        let ReportCheck::Invalid(problems) = check_report(run.root()).expect("check") else {
            panic!("expected invalid report");
        };
        assert!(problems.iter().any(|p| p.contains("schema_version")));
        assert!(problems.iter().any(|p| p.contains("status 'shipping'")));

        run.write_raw_report("not json").expect("write");
        let ReportCheck::Invalid(problems) = check_report(run.root()).expect("check") else {
            panic!("expected invalid report");
        };
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn unparseable_updated_at_is_invalid() {
        let run = TestRun::new().expect("run");
        run.write_report(&RunnerReport {
            updated_at: "yesterday".to_string(),
            ..RunnerReport::initial()
        })
        .expect("write");

        let ReportCheck::Invalid(problems) = check_report(run.root()).expect("check") else {
            panic!("expected invalid report");
        };
        assert_eq!(problems.len(), 1, "{problems:?}");
        assert!(problems[0].contains("yesterday"));
    }
}
