//! Retention plans: the keep/delete partition of a snapshot set

use crate::schedule::Bucket;
use serde::Serialize;
use snap_core::Snapshot;
use std::fmt;

/// Why a snapshot is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeepReason {
    /// Most recent snapshot in the set; never deleted
    Newest,
    /// Among the N most recent snapshots
    KeepRecent,
    /// Younger than the first boundary
    Recent,
    /// Most recent snapshot of its bucket
    Representative { bucket: Bucket },
}

/// Why a snapshot is deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeleteReason {
    /// At or beyond the schedule's horizon
    BeyondHorizon,
    /// Its bucket is already represented by a more recent snapshot
    Superseded { by: String },
    /// Removed to respect the total count cap
    OverCount,
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepReason::Newest => write!(f, "newest"),
            KeepReason::KeepRecent => write!(f, "keep-recent"),
            KeepReason::Recent => write!(f, "recent"),
            KeepReason::Representative { bucket } => write!(f, "{}", bucket),
        }
    }
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteReason::BeyondHorizon => write!(f, "beyond horizon"),
            DeleteReason::Superseded { by } => write!(f, "superseded by {}", by),
            DeleteReason::OverCount => write!(f, "over count"),
        }
    }
}

/// A kept snapshot and the rule that kept it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kept {
    pub snapshot: Snapshot,
    pub reason: KeepReason,
}

/// A snapshot scheduled for deletion and the rule that dropped it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Victim {
    pub snapshot: Snapshot,
    pub reason: DeleteReason,
}

/// Keep/delete partition of one snapshot set
///
/// Both halves are ordered oldest first. Every input snapshot appears in
/// exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetentionPlan {
    pub(crate) keep: Vec<Kept>,
    pub(crate) delete: Vec<Victim>,
}

impl RetentionPlan {
    /// Snapshots to keep, oldest first
    pub fn keep(&self) -> &[Kept] {
        &self.keep
    }

    /// Snapshots to delete, oldest first
    pub fn delete(&self) -> &[Victim] {
        &self.delete
    }

    /// Names of kept snapshots, oldest first
    pub fn keep_names(&self) -> Vec<&str> {
        self.keep.iter().map(|k| k.snapshot.name.as_str()).collect()
    }

    /// Names of snapshots to delete, oldest first
    pub fn delete_names(&self) -> Vec<&str> {
        self.delete.iter().map(|v| v.snapshot.name.as_str()).collect()
    }

    /// Total number of snapshots covered by the plan
    pub fn len(&self) -> usize {
        self.keep.len() + self.delete.len()
    }

    /// True if the plan covers no snapshots
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if nothing needs deleting
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty()
    }
}
