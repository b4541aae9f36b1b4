//! Status derivation engine.
//!
//! Reconciles orchestrator metadata with locally observed signals into one
//! canonical [`DerivedStatus`] plus the orthogonal `archived` flag. Rules are
//! checked top to bottom and the first match wins:
//!
//! | # | status             | condition                                      |
//! |---|--------------------|------------------------------------------------|
//! | - | `broken`           | metadata absent                                |
//! | 1 | `merged`           | `archive.merged_at` non-empty                  |
//! | 2 | `abandoned`        | `flags.abandoned`                              |
//! | 3 | `failed`           | `flags.setup_failed`                           |
//! | 4 | `needs attention`  | `flags.needs_attention`                        |
//! | 5 | `ready for review` | self-report status `ready_for_review`          |
//! | 6 | `needs input`      | self-report status `needs_input`               |
//! | 7 | `blocked`          | self-report status `blocked`                   |
//! | 8 | `working`          | self-report status `working`                   |
//! | 9 | `stalled`          | stall verdict `is_stalled` and session active  |
//! |10 | `active`           | session active                                 |
//! |11 | `idle`             | otherwise                                      |

use crate::core::metadata::RunMetadata;
use crate::core::types::{Derived, DerivedStatus, ReportState, Snapshot};

/// Derive the operator-facing status of a run. Never fails.
pub fn derive_status(metadata: Option<&RunMetadata>, snapshot: &Snapshot) -> Derived {
    Derived {
        derived_status: derive_label(metadata, snapshot),
        archived: is_archived(snapshot),
    }
}

/// A run is archived once its worktree is gone, whatever its status.
pub fn is_archived(snapshot: &Snapshot) -> bool {
    !snapshot.worktree_present
}

fn derive_label(metadata: Option<&RunMetadata>, snapshot: &Snapshot) -> DerivedStatus {
    let Some(meta) = metadata else {
        return DerivedStatus::Broken;
    };

    if meta.is_merged() {
        return DerivedStatus::Merged;
    }
    if meta.is_abandoned() {
        return DerivedStatus::Abandoned;
    }
    if meta.setup_failed() {
        return DerivedStatus::Failed;
    }
    if meta.needs_attention() {
        return DerivedStatus::NeedsAttention;
    }

    // Unrecognized self-report values fall through to the activity rules.
    if let Some(state) = snapshot.runner_status.as_ref().and_then(|r| r.state()) {
        return match state {
            ReportState::ReadyForReview => DerivedStatus::ReadyForReview,
            ReportState::NeedsInput => DerivedStatus::NeedsInput,
            ReportState::Blocked => DerivedStatus::Blocked,
            ReportState::Working => DerivedStatus::Working,
        };
    }

    let stalled = snapshot.stall_result.is_some_and(|stall| stall.is_stalled);
    if stalled && snapshot.tmux_active {
        return DerivedStatus::Stalled;
    }
    if snapshot.tmux_active {
        return DerivedStatus::Active;
    }
    DerivedStatus::Idle
}
