//! Snapshot directory fixtures
//!
//! A fixture is a temporary tree with a source "subvolume", a snapshot
//! directory, a fake `btrfs` script that creates and removes plain
//! directories, and a config file tying them together.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use snap_core::{format_name, Timestamp};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for `btrfs subvolume snapshot -r SRC DST` and
/// `btrfs subvolume delete DST`. `rmdir` refuses non-empty directories,
/// which tests use to inject deletion failures.
const FAKE_BTRFS: &str = r#"#!/bin/sh
case "$1 $2" in
  "subvolume snapshot") mkdir "$5" ;;
  "subvolume delete") rmdir "$3" ;;
  *) echo "unsupported: $*" >&2; exit 2 ;;
esac
"#;

pub struct SnapshotFixture {
    pub temp: TempDir,
    pub source: PathBuf,
    pub snapshots: PathBuf,
    pub config: PathBuf,
    /// Reference time the ages passed to `with_ages` were measured from
    pub created_at: Timestamp,
}

impl SnapshotFixture {
    /// Fixture with schedule `1h,1d,7d` and no snapshots
    pub fn new() -> Result<Self> {
        Self::with_schedule(&["1h", "1d", "7d"])
    }

    pub fn with_schedule(schedule: &[&str]) -> Result<Self> {
        let temp = TempDir::new()?;
        let source = temp.path().join("home");
        let snapshots = temp.path().join("snapshots");
        fs::create_dir(&source)?;
        fs::create_dir(&snapshots)?;

        let btrfs = temp.path().join("btrfs");
        write_script(&btrfs, FAKE_BTRFS)?;

        let schedule = schedule
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect::<Vec<_>>()
            .join(", ");
        let config = temp.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "[snapshot]\nsource = {:?}\ndirectory = {:?}\nbtrfs_bin = {:?}\n\n[retention]\nschedule = [{}]\n",
                source.display().to_string(),
                snapshots.display().to_string(),
                btrfs.display().to_string(),
                schedule
            ),
        )?;

        Ok(Self {
            temp,
            source,
            snapshots,
            config,
            created_at: Utc::now(),
        })
    }

    /// Create one snapshot directory per age (in minutes before `created_at`)
    ///
    /// Returns the names, in the order given.
    pub fn with_ages(&self, minutes: &[i64]) -> Result<Vec<String>> {
        minutes
            .iter()
            .map(|m| {
                let name = format_name(self.created_at - Duration::minutes(*m));
                fs::create_dir(self.snapshots.join(&name))
                    .with_context(|| format!("Failed to create snapshot {}", name))?;
                Ok(name)
            })
            .collect()
    }

    /// Names of the snapshot directories currently present, oldest first
    pub fn present(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.snapshots)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn config_arg(&self) -> &str {
        self.config.to_str().unwrap_or_default()
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)?;
    Ok(())
}
