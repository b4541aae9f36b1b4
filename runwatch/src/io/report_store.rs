//! Self-report load/save helpers (`<run_dir>/.runner/state/status.json`).

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::core::report::RunnerReport;
use crate::io::paths::RunPaths;

/// Bundled JSON schema for the self-report file.
pub const REPORT_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/runner_status/v1.schema.json"
));

/// A self-report together with the file's last modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedReport {
    pub report: RunnerReport,
    /// `None` when the filesystem does not expose a modification time.
    pub modified: Option<DateTime<Utc>>,
}

/// Load the self-report for the run directory `run_dir`.
///
/// A missing file is a normal state and yields `Ok(None)`. Read and parse
/// failures are errors; the report is not validated here.
pub fn load_report(run_dir: &Path) -> Result<Option<RunnerReport>> {
    Ok(load_report_with_mtime(run_dir)?.map(|loaded| loaded.report))
}

/// Like [`load_report`], also returning the file's modification time.
pub fn load_report_with_mtime(run_dir: &Path) -> Result<Option<LoadedReport>> {
    let path = RunPaths::new(run_dir).report_path;
    debug!(path = %path.display(), "loading runner report");
    let Some(contents) = read_if_present(&path)? else {
        debug!(path = %path.display(), "runner report absent");
        return Ok(None);
    };
    let report: RunnerReport = serde_json::from_str(&contents)
        .with_context(|| format!("parse runner report {}", path.display()))?;
    let modified = fs::metadata(&path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from);
    debug!(status = %report.status, updated_at = %report.updated_at, "runner report loaded");
    Ok(Some(LoadedReport { report, modified }))
}

/// Atomically write the self-report (temp file + rename).
pub fn write_report(run_dir: &Path, report: &RunnerReport) -> Result<()> {
    let path = RunPaths::new(run_dir).report_path;
    debug!(path = %path.display(), status = %report.status, "writing runner report");
    let mut buf = serde_json::to_string_pretty(report).context("serialize runner report")?;
    buf.push('\n');
    write_atomic(&path, &buf)
}

/// Check raw report JSON against the bundled schema.
///
/// Returns the schema violations (empty when the document conforms). Format
/// keywords are asserted, so `updated_at` must be an RFC 3339 date-time.
pub fn schema_violations(raw: &str) -> Result<Vec<String>> {
    let instance: Value = serde_json::from_str(raw).context("parse runner report json")?;
    let schema: Value = serde_json::from_str(REPORT_SCHEMA).context("parse report schema")?;
    let compiled = jsonschema::options()
        .should_validate_formats(true)
        .build(&schema)
        .map_err(|err| anyhow!("invalid schema: {}", err))?;
    Ok(compiled
        .iter_errors(&instance)
        .map(|err| err.to_string())
        .collect())
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_if_present(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("runner report path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp runner report {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace runner report {}", path.display()))?;
    Ok(())
}
