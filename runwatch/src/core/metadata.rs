//! Orchestrator-owned run metadata, consumed read-only.
//!
//! Both sub-records are optional. An unset sub-record reads exactly like one
//! whose fields are all false or empty.

use serde::{Deserialize, Serialize};

/// Persisted record the orchestrator keeps for each run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunMetadata {
    pub archive: Option<Archive>,
    pub flags: Option<Flags>,
}

/// Archival timestamps (RFC 3339 strings, empty when unset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Archive {
    pub merged_at: Option<String>,
    pub archived_at: Option<String>,
}

/// Operator or lifecycle assertions about the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub abandoned: bool,
    pub setup_failed: bool,
    pub needs_attention: bool,
}

impl RunMetadata {
    /// True when the archive record carries a non-empty `merged_at`.
    pub fn is_merged(&self) -> bool {
        self.archive
            .as_ref()
            .and_then(|archive| archive.merged_at.as_deref())
            .is_some_and(|merged_at| !merged_at.is_empty())
    }

    pub fn is_abandoned(&self) -> bool {
        self.flags().abandoned
    }

    pub fn setup_failed(&self) -> bool {
        self.flags().setup_failed
    }

    pub fn needs_attention(&self) -> bool {
        self.flags().needs_attention
    }

    /// Flags with absent treated as all-false.
    pub fn flags(&self) -> Flags {
        self.flags.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_sub_records_read_as_false() {
        let meta = RunMetadata::default();
        assert!(!meta.is_merged());
        assert!(!meta.is_abandoned());
        assert!(!meta.setup_failed());
        assert!(!meta.needs_attention());
    }

    #[test]
    fn empty_merged_at_is_not_merged() {
        let meta = RunMetadata {
            archive: Some(Archive {
                merged_at: Some(String::new()),
                archived_at: Some("2026-01-02T03:04:05Z".to_string()),
            }),
            flags: None,
        };
        assert!(!meta.is_merged());
    }

    #[test]
    fn parses_partial_json() {
        let meta: RunMetadata =
            serde_json::from_str(r#"{"flags":{"needs_attention":true}}"#).expect("parse");
        assert!(meta.needs_attention());
        assert!(!meta.is_abandoned());
        assert_eq!(meta.archive, None);

        let meta: RunMetadata =
            serde_json::from_str(r#"{"archive":null,"flags":null,"branch":"x"}"#).expect("parse");
        assert_eq!(meta, RunMetadata::default());
    }
}
