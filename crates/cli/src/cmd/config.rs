//! Configuration inspection commands

use anyhow::{Context, Result};
use cli_lib::config::{self as system_config, SystemConfig};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => system_config::config_file_path().context("Could not determine config file path"),
    }
}

/// Show the effective configuration
pub fn run_list(config_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(config_path)?;
    let path = resolve_path(config_path)?;

    println!("{}", "Configuration".bold());
    if path.exists() {
        println!("{}: {}\n", "Location".dimmed(), path.display().dimmed());
    } else {
        println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            path.display().dimmed(),
            "(not present, using defaults)".yellow()
        );
    }

    print_config(&config);
    Ok(())
}

fn print_config(config: &SystemConfig) {
    let unset = || "(unset)".dimmed().to_string();

    println!("{}", "[snapshot]".yellow());
    println!(
        "  {} = {}",
        "source".cyan(),
        config
            .snapshot
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset)
    );
    println!(
        "  {} = {}",
        "directory".cyan(),
        config
            .snapshot
            .directory
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset)
    );
    println!(
        "  {} = {}",
        "btrfs_bin".cyan(),
        config.snapshot.btrfs_bin.display()
    );

    println!("\n{}", "[retention]".yellow());
    println!(
        "  {} = [{}]",
        "schedule".cyan(),
        config.retention.schedule.join(", ")
    );
    println!(
        "  {} = {}",
        "keep_recent".cyan(),
        config.retention.keep_recent
    );
    println!(
        "  {} = {}",
        "max_count".cyan(),
        config
            .retention
            .max_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(no limit)".dimmed().to_string())
    );
}

/// Show the config file path and optionally create it
pub fn run_path(config_path: Option<&Path>, create: bool) -> Result<()> {
    let path = resolve_path(config_path)?;

    if create && !path.exists() {
        system_config::init_if_missing(&path)?;
        println!("{} Created config file at: {}", "✓".green(), path.display());
    } else if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{}", path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}
