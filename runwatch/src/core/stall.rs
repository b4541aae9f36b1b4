//! Idle-threshold stall heuristic.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::types::StallResult;

/// Compare the session's last activity against `threshold`.
///
/// Returns `None` when no activity timestamp is known, so the snapshot
/// records "not computed" rather than a false negative.
pub fn detect_stall(
    last_activity: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Option<StallResult> {
    let last_activity = last_activity?;
    let idle = (now - last_activity).to_std().unwrap_or(Duration::ZERO);
    Some(StallResult {
        is_stalled: idle >= threshold,
        stalled_duration: idle,
    })
}
