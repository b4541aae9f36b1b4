//! I/O adapters for status checks: report files, metadata, config, tmux.

pub mod config;
pub mod metadata;
pub mod paths;
pub mod process;
pub mod report_store;
pub mod tmux;
