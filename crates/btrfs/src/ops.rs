//! Snapshot operations
//!
//! Creating and deleting snapshots is the only filesystem mutation the tool
//! performs. Both go through `SnapshotOps` so planning and orchestration can
//! be exercised against `MemoryOps`.

use crate::error::OpsError;
use crate::Result;
use snap_core::{naming, Snapshot, Timestamp};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Create and delete snapshots
pub trait SnapshotOps {
    /// Take a read-only snapshot of `subvolume` inside `snapshot_dir`,
    /// named after `at`
    ///
    /// Either a complete snapshot exists afterwards, or an error is
    /// returned and nothing usable is left behind.
    fn create(&self, subvolume: &Path, snapshot_dir: &Path, at: Timestamp) -> Result<Snapshot>;

    /// Delete the snapshot called `name` inside `snapshot_dir`
    fn delete(&self, snapshot_dir: &Path, name: &str) -> Result<()>;
}

/// Snapshot operations backed by the `btrfs` command line tool
#[derive(Debug, Clone)]
pub struct BtrfsCli {
    program: PathBuf,
}

impl Default for BtrfsCli {
    fn default() -> Self {
        Self::new("btrfs")
    }
}

impl BtrfsCli {
    /// Use the given `btrfs` binary (name on PATH or absolute path)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Binary this instance invokes
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[&OsStr]) -> Result<()> {
        let command = std::iter::once(self.program.as_os_str())
            .chain(args.iter().copied())
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!("Running {}", command);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| OpsError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(OpsError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl SnapshotOps for BtrfsCli {
    fn create(&self, subvolume: &Path, snapshot_dir: &Path, at: Timestamp) -> Result<Snapshot> {
        let snapshot = Snapshot::at(at);
        let target = snapshot_dir.join(&snapshot.name);

        if target.symlink_metadata().is_ok() {
            return Err(OpsError::AlreadyExists(target));
        }

        let result = self.run(&[
            OsStr::new("subvolume"),
            OsStr::new("snapshot"),
            OsStr::new("-r"),
            subvolume.as_os_str(),
            target.as_os_str(),
        ]);

        if let Err(e) = result {
            // Do not leave a half-made snapshot for the next run to trust
            if target.symlink_metadata().is_ok() {
                warn!("Removing incomplete snapshot {}", target.display());
                if let Err(cleanup) = self.run(&[
                    OsStr::new("subvolume"),
                    OsStr::new("delete"),
                    target.as_os_str(),
                ]) {
                    warn!("Failed to remove incomplete snapshot: {}", cleanup);
                }
            }
            return Err(e);
        }

        if !target.is_dir() {
            return Err(OpsError::Missing(target));
        }

        info!("Created snapshot {}", target.display());
        Ok(snapshot)
    }

    fn delete(&self, snapshot_dir: &Path, name: &str) -> Result<()> {
        check_name(name)?;

        let target = snapshot_dir.join(name);
        if target.symlink_metadata().is_err() {
            return Err(OpsError::NotFound(target));
        }

        self.run(&[
            OsStr::new("subvolume"),
            OsStr::new("delete"),
            target.as_os_str(),
        ])?;

        info!("Deleted snapshot {}", target.display());
        Ok(())
    }
}

/// Only plain snapshot names may be deleted, never paths
pub(crate) fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if naming::parse_name(name).is_ok() => Ok(()),
        _ => Err(OpsError::InvalidName(name.to_string())),
    }
}
