//! Create a snapshot and prune the snapshot directory

use super::{load_config, RetentionArgs};
use anyhow::{Context, Result};
use btrfs::{BtrfsCli, SnapshotDir};
use cli_lib::locks::PruneLock;
use cli_lib::orchestrator::{CycleReport, Job, Orchestrator};
use cli_lib::util;
use owo_colors::OwoColorize;
use retention::Planner;
use snap_core::SystemClock;
use std::path::{Path, PathBuf};

/// `snapthin run`
pub fn run(
    config_path: Option<&Path>,
    source: Option<PathBuf>,
    args: RetentionArgs,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path, args.into_overrides(source))?;
    let source = config.source()?.to_path_buf();
    execute(&config, Some(source), dry_run)
}

/// `snapthin prune`
pub fn prune(config_path: Option<&Path>, args: RetentionArgs, dry_run: bool) -> Result<()> {
    let config = load_config(config_path, args.into_overrides(None))?;
    execute(&config, None, dry_run)
}

fn execute(
    config: &cli_lib::config::SystemConfig,
    source: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    // 1. Resolve inputs
    let snapshot_dir = config.snapshot_dir()?.to_path_buf();
    let planner = Planner::new(config.policy()?);

    // 2. Take the directory lock (dry runs mutate nothing and skip it)
    let lock = if dry_run || !snapshot_dir.is_dir() {
        None
    } else {
        Some(PruneLock::acquire(&snapshot_dir)?)
    };

    // 3. Run the cycle
    let ops = BtrfsCli::new(&config.snapshot.btrfs_bin);
    let listing = SnapshotDir::new(&snapshot_dir);
    let clock = SystemClock;
    let orchestrator = Orchestrator::new(&ops, &listing, &clock, planner);

    let job = Job {
        source,
        snapshot_dir: snapshot_dir.clone(),
        dry_run,
    };
    let report = orchestrator
        .run_cycle(&job)
        .with_context(|| format!("Snapshot cycle failed for {}", snapshot_dir.display()))?;

    // 4. Release the lock before reporting
    if let Some(lock) = lock {
        lock.release()?;
    }

    // 5. Display results
    display_report(&report);

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} deletions failed",
            report.failed.len(),
            report.plan.delete().len()
        );
    }

    Ok(())
}

fn display_report(report: &CycleReport) {
    if report.dry_run {
        println!("{}", "Dry run: nothing was created or deleted".yellow().bold());
        println!();
        util::display_plan(&report.plan, report.now);
        println!();
        println!(
            "Would keep {}, would delete {}",
            report.plan.keep().len().to_string().green(),
            report.plan.delete().len().to_string().yellow()
        );
        return;
    }

    if let Some(created) = &report.created {
        println!("{} Created {}", "✓".green(), created.name.cyan());
    }

    if report.plan.delete().is_empty() {
        println!("{}", "Nothing to prune".dimmed());
    } else {
        for name in &report.deleted {
            println!("{} Deleted {}", "✓".green(), name);
        }
        for failure in &report.failed {
            println!("{} {}: {}", "✗".red(), failure.name, failure.error.red());
        }
    }

    println!(
        "Kept {}, deleted {}{}",
        report.plan.keep().len().to_string().green(),
        report.deleted.len().to_string().yellow(),
        if report.failed.is_empty() {
            String::new()
        } else {
            format!(", failed {}", report.failed.len().to_string().red())
        }
    );
}
