//! Stable exit codes for `runwatch` commands.

/// Command succeeded; for `report check`, the report is valid.
pub const OK: i32 = 0;
/// Command failed (bad arguments, config, or unrecoverable I/O).
pub const ERROR: i32 = 1;
/// `report check` found no self-report or an invalid one.
pub const REPORT_INVALID: i32 = 2;
