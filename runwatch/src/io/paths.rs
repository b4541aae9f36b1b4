//! Canonical paths inside a run directory.
//!
//! A run directory holds the run's state next to (not inside) its worktree,
//! so removing the worktree leaves the metadata and self-report readable:
//!
//! ```text
//! <run_dir>/
//! ├── .runner/state/{status.json,meta.json,watch.toml}
//! └── worktree/
//! ```

use std::path::PathBuf;

/// All canonical paths for a run directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    /// Default worktree location; callers may point elsewhere.
    pub worktree_dir: PathBuf,
    /// Runner self-report, written wholesale by the runner process.
    pub report_path: PathBuf,
    /// Orchestrator metadata record (read-only here).
    pub metadata_path: PathBuf,
    pub config_path: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state_dir = root.join(".runner").join("state");
        Self {
            root: root.clone(),
            state_dir: state_dir.clone(),
            worktree_dir: root.join("worktree"),
            report_path: state_dir.join("status.json"),
            metadata_path: state_dir.join("meta.json"),
            config_path: state_dir.join("watch.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn state_lives_beside_worktree() {
        let paths = RunPaths::new("/work/run-1");
        assert_eq!(
            paths.report_path,
            Path::new("/work/run-1/.runner/state/status.json")
        );
        assert_eq!(
            paths.metadata_path,
            Path::new("/work/run-1/.runner/state/meta.json")
        );
        assert_eq!(paths.worktree_dir, Path::new("/work/run-1/worktree"));
        assert!(!paths.metadata_path.starts_with(&paths.worktree_dir));
        assert!(!paths.report_path.starts_with(&paths.worktree_dir));
    }
}
