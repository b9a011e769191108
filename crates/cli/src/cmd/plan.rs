//! Show the retention plan without touching anything

use super::{load_config, RetentionArgs};
use anyhow::{Context, Result};
use btrfs::SnapshotDir;
use cli_lib::util;
use owo_colors::OwoColorize;
use retention::{Planner, RetentionPlan};
use serde::Serialize;
use snap_core::{Clock, SystemClock, Timestamp};
use std::path::Path;

#[derive(Serialize)]
struct PlanOutput<'a> {
    now: Timestamp,
    schedule: String,
    keep_recent: usize,
    max_count: Option<usize>,
    #[serde(flatten)]
    plan: &'a RetentionPlan,
}

pub fn run(config_path: Option<&Path>, args: RetentionArgs, json: bool) -> Result<()> {
    // 1. Resolve configuration
    let config = load_config(config_path, args.into_overrides(None))?;
    let snapshot_dir = config.snapshot_dir()?;

    // 2. Read snapshots
    let snapshots = SnapshotDir::new(snapshot_dir)
        .read()
        .with_context(|| format!("Failed to read snapshots in {}", snapshot_dir.display()))?;

    // 3. Plan
    let now = SystemClock.now();
    let planner = Planner::new(config.policy()?);
    let plan = planner.plan(&snapshots, now);
    let policy = planner.policy();

    // 4. Display
    if json {
        let output = PlanOutput {
            now,
            schedule: policy.schedule.to_string(),
            keep_recent: policy.keep_recent,
            max_count: policy.max_count,
            plan: &plan,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Retention Plan".bold());
    println!(
        "{}: {}  {}: {}",
        "Directory".dimmed(),
        snapshot_dir.display(),
        "Schedule".dimmed(),
        policy.schedule
    );
    println!();

    if plan.is_empty() {
        println!("{}", "No snapshots found".dimmed());
        return Ok(());
    }

    util::display_plan(&plan, now);
    println!();
    println!(
        "Keep {}, delete {}",
        plan.keep().len().to_string().green(),
        plan.delete().len().to_string().yellow()
    );

    Ok(())
}
