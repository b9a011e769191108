//! CLI command implementations

pub mod config;
pub mod list;
pub mod plan;
pub mod run;

use anyhow::Result;
use clap::Args;
use cli_lib::config::{self as system_config, Overrides, SystemConfig};
use std::path::{Path, PathBuf};

/// Flags shared by every command that plans
#[derive(Args, Debug, Clone, Default)]
pub struct RetentionArgs {
    /// Snapshot directory (default: snapshot.directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Comma-separated age boundaries, e.g. "1h,1d,7d,30d"
    #[arg(short, long)]
    pub schedule: Option<String>,

    /// Always keep this many of the most recent snapshots
    #[arg(long)]
    pub keep_recent: Option<usize>,

    /// Never keep more than this many snapshots
    #[arg(long)]
    pub max_count: Option<usize>,
}

impl RetentionArgs {
    fn into_overrides(self, source: Option<PathBuf>) -> Overrides {
        Overrides {
            source,
            directory: self.dir,
            schedule: self.schedule,
            keep_recent: self.keep_recent,
            max_count: self.max_count,
        }
    }
}

/// Load the config file and layer command-line values on top
pub(crate) fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<SystemConfig> {
    let mut config = system_config::load(path)?;
    config.apply(overrides)?;
    config.validate()?;
    Ok(config)
}
