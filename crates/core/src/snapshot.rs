//! Snapshot records and ordered snapshot sets

use crate::naming::{self, NameError};
use crate::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A read-only snapshot, identified by name and creation time
///
/// Ordering is by timestamp, then by name, so coinciding timestamps
/// always sort the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Directory entry name
    pub name: String,
    /// Creation time (UTC, second resolution)
    pub timestamp: Timestamp,
}

impl Snapshot {
    /// Create a snapshot record from an explicit name and timestamp
    pub fn new(name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            name: name.into(),
            timestamp,
        }
    }

    /// Create a snapshot record named after its timestamp
    pub fn at(timestamp: Timestamp) -> Self {
        Self::new(naming::format_name(timestamp), timestamp)
    }

    /// Parse a directory entry name into a snapshot record
    pub fn from_name(name: &str) -> Result<Self, NameError> {
        let timestamp = naming::parse_name(name)?;
        Ok(Self::new(name, timestamp))
    }

    /// Age relative to `now`, clamped at zero for timestamps in the future
    pub fn age(&self, now: Timestamp) -> Duration {
        let age = now.signed_duration_since(self.timestamp);
        if age < Duration::zero() {
            Duration::zero()
        } else {
            age
        }
    }
}

impl Ord for Snapshot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Snapshot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Snapshots ordered oldest first
///
/// Names are unique within a set: when the same name is supplied twice
/// only the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SnapshotSet {
    snapshots: Vec<Snapshot>,
}

impl SnapshotSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot, keeping the set ordered
    ///
    /// Returns false if a snapshot with the same name is already present.
    pub fn insert(&mut self, snapshot: Snapshot) -> bool {
        if self.contains(&snapshot.name) {
            return false;
        }
        let pos = self
            .snapshots
            .binary_search(&snapshot)
            .unwrap_or_else(|pos| pos);
        self.snapshots.insert(pos, snapshot);
        true
    }

    /// Check whether a snapshot with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.snapshots.iter().any(|s| s.name == name)
    }

    /// Number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if the set holds no snapshots
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot
    pub fn newest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Oldest snapshot
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }
}

impl FromIterator<Snapshot> for SnapshotSet {
    fn from_iter<I: IntoIterator<Item = Snapshot>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut snapshots: Vec<Snapshot> = iter
            .into_iter()
            .filter(|s| seen.insert(s.name.clone()))
            .collect();
        snapshots.sort();
        Self { snapshots }
    }
}

impl From<Vec<Snapshot>> for SnapshotSet {
    fn from(snapshots: Vec<Snapshot>) -> Self {
        snapshots.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a SnapshotSet {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

impl IntoIterator for SnapshotSet {
    type Item = Snapshot;
    type IntoIter = std::vec::IntoIter<Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}
