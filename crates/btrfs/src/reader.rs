//! Snapshot directory reader
//!
//! Lists a snapshot directory and turns entry names into typed snapshot
//! records. Anything that is not a directory named `YYYYMMDDHHMMSS` is
//! skipped: snapshot directories often hold lock files, notes, or
//! snapshots made by other tools.

use crate::error::OpsError;
use crate::Result;
use snap_core::{Snapshot, SnapshotSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Anything that can produce the current snapshot set
pub trait SnapshotListing {
    /// List snapshots, oldest first
    fn list(&self) -> Result<SnapshotSet>;
}

/// A directory holding snapshots
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    path: PathBuf,
}

impl SnapshotDir {
    /// Reader for the given directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily iterate the snapshots in the directory, in listing order
    ///
    /// Each call starts a fresh listing. Fails only if the directory itself
    /// cannot be read; bad entries are skipped.
    pub fn entries(&self) -> Result<SnapshotEntries> {
        let meta = std::fs::metadata(&self.path).map_err(|e| OpsError::io(&self.path, e))?;
        if !meta.is_dir() {
            return Err(OpsError::NotADirectory(self.path.clone()));
        }

        // Surface permission problems here rather than as a skipped entry
        std::fs::read_dir(&self.path).map_err(|e| OpsError::io(&self.path, e))?;

        let inner = WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter();

        Ok(SnapshotEntries { inner })
    }

    /// Read all snapshots, ordered oldest first
    pub fn read(&self) -> Result<SnapshotSet> {
        let set: SnapshotSet = self.entries()?.collect();
        debug!("Read {} snapshots from {}", set.len(), self.path.display());
        Ok(set)
    }
}

impl SnapshotListing for SnapshotDir {
    fn list(&self) -> Result<SnapshotSet> {
        self.read()
    }
}

/// Iterator over the snapshots of one directory listing
pub struct SnapshotEntries {
    inner: walkdir::IntoIter,
}

impl Iterator for SnapshotEntries {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                debug!("Skipping non-directory {}", entry.path().display());
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                debug!("Skipping non-UTF-8 entry {}", entry.path().display());
                continue;
            };

            match Snapshot::from_name(name) {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => debug!("Skipping {}: {}", name, e),
            }
        }
    }
}
