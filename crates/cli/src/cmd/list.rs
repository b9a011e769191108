//! List snapshots in the snapshot directory

use super::load_config;
use anyhow::{Context, Result};
use btrfs::SnapshotDir;
use cli_lib::config::Overrides;
use cli_lib::util;
use owo_colors::OwoColorize;
use serde::Serialize;
use snap_core::{Clock, SystemClock, Timestamp};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    timestamp: Timestamp,
    age_secs: i64,
}

pub fn run(config_path: Option<&Path>, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(
        config_path,
        Overrides {
            directory: dir,
            ..Default::default()
        },
    )?;
    let snapshot_dir = config.snapshot_dir()?;

    let snapshots = SnapshotDir::new(snapshot_dir)
        .read()
        .with_context(|| format!("Failed to read snapshots in {}", snapshot_dir.display()))?;
    let now = SystemClock.now();

    if json {
        let entries: Vec<Entry> = snapshots
            .iter()
            .map(|s| Entry {
                name: &s.name,
                timestamp: s.timestamp,
                age_secs: s.age(now).num_seconds(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("{}", format!("No snapshots in {}", snapshot_dir.display()).dimmed());
        return Ok(());
    }

    println!(
        "{} ({})",
        "Snapshots".bold(),
        snapshots.len().to_string().cyan()
    );
    for snapshot in snapshots.iter().rev() {
        println!(
            "  {}  {}  {}",
            snapshot.name.cyan(),
            util::format_absolute_time(snapshot.timestamp),
            util::format_relative_time(snapshot.timestamp, now).dimmed()
        );
    }

    Ok(())
}
