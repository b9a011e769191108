//! In-memory snapshot store
//!
//! Behaves like a single snapshot directory. Paths passed to the
//! `SnapshotOps` methods are ignored. Failures can be injected per
//! operation to exercise error handling.

use crate::error::OpsError;
use crate::ops::check_name;
use crate::reader::SnapshotListing;
use crate::{Result, SnapshotOps};
use parking_lot::Mutex;
use snap_core::{Snapshot, SnapshotSet, Timestamp};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Default)]
struct State {
    snapshots: BTreeMap<String, Snapshot>,
    fail_create: bool,
    fail_delete: HashSet<String>,
    created: Vec<String>,
    deleted: Vec<String>,
}

/// In-memory `SnapshotOps` + `SnapshotListing`
#[derive(Debug, Default)]
pub struct MemoryOps {
    state: Mutex<State>,
}

impl MemoryOps {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with snapshots
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        let ops = Self::new();
        {
            let mut state = ops.state.lock();
            for snapshot in snapshots {
                state.snapshots.insert(snapshot.name.clone(), snapshot);
            }
        }
        ops
    }

    /// Make every subsequent `create` fail
    pub fn fail_create(&self, fail: bool) {
        self.state.lock().fail_create = fail;
    }

    /// Make `delete` fail for this name
    pub fn fail_delete(&self, name: &str) {
        self.state.lock().fail_delete.insert(name.to_string());
    }

    /// Current contents
    pub fn snapshots(&self) -> SnapshotSet {
        self.state.lock().snapshots.values().cloned().collect()
    }

    /// Names created so far, in call order
    pub fn created(&self) -> Vec<String> {
        self.state.lock().created.clone()
    }

    /// Names deleted so far, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }
}

impl SnapshotOps for MemoryOps {
    fn create(&self, _subvolume: &Path, snapshot_dir: &Path, at: Timestamp) -> Result<Snapshot> {
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(OpsError::Backend("snapshot creation failed".to_string()));
        }

        let snapshot = Snapshot::at(at);
        if state.snapshots.contains_key(&snapshot.name) {
            return Err(OpsError::AlreadyExists(snapshot_dir.join(&snapshot.name)));
        }

        state.snapshots.insert(snapshot.name.clone(), snapshot.clone());
        state.created.push(snapshot.name.clone());
        Ok(snapshot)
    }

    fn delete(&self, snapshot_dir: &Path, name: &str) -> Result<()> {
        check_name(name)?;

        let mut state = self.state.lock();
        if state.fail_delete.contains(name) {
            return Err(OpsError::Backend(format!("cannot delete {}", name)));
        }
        if state.snapshots.remove(name).is_none() {
            return Err(OpsError::NotFound(snapshot_dir.join(name)));
        }

        state.deleted.push(name.to_string());
        Ok(())
    }
}

impl SnapshotListing for MemoryOps {
    fn list(&self) -> Result<SnapshotSet> {
        Ok(self.snapshots())
    }
}
