//! Watcher configuration stored under `.runner/state/watch.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Watcher configuration (TOML).
///
/// Edited by humans; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Session idle time, in seconds, after which an active run counts as stalled.
    pub stall_threshold_secs: u64,

    pub tmux: TmuxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmuxConfig {
    /// Program used for session queries.
    pub binary: String,

    /// Wall-clock budget per tmux call.
    pub timeout_secs: u64,

    /// Truncate captured tmux output beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            binary: "tmux".to_string(),
            timeout_secs: 5,
            output_limit_bytes: 4096,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            stall_threshold_secs: 10 * 60,
            tmux: TmuxConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stall_threshold_secs == 0 {
            return Err(anyhow!("stall_threshold_secs must be > 0"));
        }
        if self.tmux.binary.trim().is_empty() {
            return Err(anyhow!("tmux.binary must be non-empty"));
        }
        if self.tmux.timeout_secs == 0 {
            return Err(anyhow!("tmux.timeout_secs must be > 0"));
        }
        if self.tmux.output_limit_bytes == 0 {
            return Err(anyhow!("tmux.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn stall_threshold(&self) -> Duration {
        Duration::from_secs(self.stall_threshold_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WatchConfig::default()`.
pub fn load_config(path: &Path) -> Result<WatchConfig> {
    if !path.exists() {
        let cfg = WatchConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WatchConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, WatchConfig::default());
        assert_eq!(cfg.stall_threshold(), Duration::from_secs(600));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("watch.toml");
        fs::write(&path, "stall_threshold_secs = 90\n\n[tmux]\nbinary = \"/opt/tmux\"\n")
            .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.stall_threshold_secs, 90);
        assert_eq!(cfg.tmux.binary, "/opt/tmux");
        assert_eq!(cfg.tmux.timeout_secs, 5);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("watch.toml");
        fs::write(&path, "stall_threshold_secs = 0\n").expect("write");

        let err = load_config(&path).expect_err("invalid");
        assert!(err.to_string().contains("stall_threshold_secs"));
    }
}
