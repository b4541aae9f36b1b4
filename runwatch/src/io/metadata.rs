//! Read-only loader for the orchestrator's run metadata record.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::metadata::RunMetadata;
use crate::io::report_store::read_if_present;

/// Load run metadata from `path`.
///
/// Returns `Ok(None)` when the record does not exist. This module never
/// writes the record; the orchestrator owns it.
pub fn load_metadata(path: &Path) -> Result<Option<RunMetadata>> {
    debug!(path = %path.display(), "loading run metadata");
    let Some(contents) = read_if_present(path)? else {
        debug!(path = %path.display(), "run metadata absent");
        return Ok(None);
    };
    let meta: RunMetadata = serde_json::from_str(&contents)
        .with_context(|| format!("parse run metadata {}", path.display()))?;
    Ok(Some(meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_metadata_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let loaded = load_metadata(&temp.path().join("meta.json")).expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn loads_flags_and_archive() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("meta.json");
        fs::write(
            &path,
            r#"{"archive":{"merged_at":"2026-02-01T10:00:00Z"},"flags":{"abandoned":true}}"#,
        )
        .expect("write");

        let meta = load_metadata(&path).expect("load").expect("present");
        assert!(meta.is_merged());
        assert!(meta.is_abandoned());
        assert!(!meta.setup_failed());
    }

    #[test]
    fn malformed_metadata_is_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("meta.json");
        fs::write(&path, "{").expect("write");
        assert!(load_metadata(&path).is_err());
    }
}
