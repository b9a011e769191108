//! Lock file management for prune exclusivity
//!
//! Only one instance may list and delete snapshots in a directory at a
//! time. The lock lives inside the snapshot directory so every instance
//! pointed at the same directory sees it.
//!
//! Exclusion comes from `flock` alone: the kernel drops the lock when its
//! holder exits, so a refused `flock` always means a live holder. The file
//! content (pid, start time) is informational. The file is unlinked only
//! while the lock is still held, and an acquirer re-checks after locking
//! that its descriptor still refers to the file at the path.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Lock file name inside the snapshot directory
pub const LOCK_FILE: &str = ".snapthin.lock";

/// Exclusive lock on a snapshot directory
pub struct PruneLock {
    path: PathBuf,
    // Holds the flock; closed after the path is unlinked
    #[allow(dead_code)]
    file: File,
    unlinked: bool,
}

/// Lock file content
#[derive(Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    started_at: DateTime<Utc>,
}

impl PruneLock {
    /// Acquire the lock for `snapshot_dir`
    ///
    /// Fails immediately if another process holds the lock.
    pub fn acquire(snapshot_dir: &Path) -> Result<Self> {
        let lock_path = snapshot_dir.join(LOCK_FILE);

        loop {
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

            if !try_flock_exclusive(&file)? {
                let holder = Self::read_lock_content(&mut file)
                    .map(|content| format!("pid {}", content.pid))
                    .unwrap_or_else(|_| "unknown pid".to_string());
                anyhow::bail!(
                    "Another snapthin instance is working on {} (lock held by {})",
                    snapshot_dir.display(),
                    holder
                );
            }

            // The previous holder may have unlinked the file between our
            // open and our flock; that inode no longer excludes anyone
            if !same_file(&file, &lock_path)? {
                tracing::debug!("Lock file {} was replaced, retrying", lock_path.display());
                continue;
            }

            Self::write_lock_content(&mut file)?;
            tracing::debug!("Acquired lock {}", lock_path.display());

            return Ok(Self {
                path: lock_path,
                file,
                unlinked: false,
            });
        }
    }

    /// Remove the lock file, then release the lock
    pub fn release(mut self) -> Result<()> {
        self.unlink().context("Failed to remove lock file")
    }

    /// Lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unlink(&mut self) -> std::io::Result<()> {
        if self.unlinked {
            return Ok(());
        }
        self.unlinked = true;
        std::fs::remove_file(&self.path)
    }

    fn write_lock_content(file: &mut File) -> Result<()> {
        let content = LockContent {
            pid: std::process::id(),
            started_at: Utc::now(),
        };

        let serialized =
            serde_json::to_string(&content).context("Failed to serialize lock content")?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn read_lock_content(file: &mut File) -> Result<LockContent> {
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let content: LockContent =
            serde_json::from_str(&contents).context("Failed to deserialize lock content")?;
        Ok(content)
    }
}

impl Drop for PruneLock {
    fn drop(&mut self) {
        // `file` is still open here, so the unlink happens under the lock
        let _ = self.unlink();
    }
}

/// Try to acquire exclusive file lock (non-blocking)
#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> Result<bool> {
    Ok(true)
}

/// True if `file` is still the file found at `path`
#[cfg(unix)]
fn same_file(file: &File, path: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match std::fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
fn same_file(_file: &File, path: &Path) -> Result<bool> {
    Ok(path.exists())
}
