//! System configuration
//!
//! Loaded from `$XDG_CONFIG_HOME/snapthin/config.toml` unless `--config`
//! points elsewhere. Command-line flags override file values, which override
//! built-in defaults.

use anyhow::{Context, Result};
use retention::{DecaySchedule, RetentionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub snapshot: SnapshotConfig,
    pub retention: RetentionConfig,
}

/// `[snapshot]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Subvolume to snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Directory holding the snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// `btrfs` binary (default: looked up on PATH)
    pub btrfs_bin: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            source: None,
            directory: None,
            btrfs_bin: PathBuf::from("btrfs"),
        }
    }
}

/// `[retention]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Age boundaries, humantime syntax (default: 1h, 1d, 7d, 30d, 365d)
    pub schedule: Vec<String>,
    /// Always keep this many of the most recent snapshots (default: 0)
    pub keep_recent: usize,
    /// Cap on retained snapshots (default: none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            schedule: ["1h", "1d", "7d", "30d", "365d"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keep_recent: 0,
            max_count: None,
        }
    }
}

/// Values supplied on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub schedule: Option<String>,
    pub keep_recent: Option<usize>,
    pub max_count: Option<usize>,
}

impl SystemConfig {
    /// Apply command-line overrides on top of this configuration
    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(source) = overrides.source {
            self.snapshot.source = Some(source);
        }
        if let Some(directory) = overrides.directory {
            self.snapshot.directory = Some(directory);
        }
        if let Some(schedule) = overrides.schedule {
            // Validate now so the error names the flag's value
            DecaySchedule::parse(&schedule)
                .with_context(|| format!("Invalid --schedule '{}'", schedule))?;
            self.retention.schedule = schedule
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(keep_recent) = overrides.keep_recent {
            self.retention.keep_recent = keep_recent;
        }
        if let Some(max_count) = overrides.max_count {
            self.retention.max_count = Some(max_count);
        }
        Ok(())
    }

    /// Build the retention policy described by this configuration
    pub fn policy(&self) -> Result<RetentionPolicy> {
        let schedule = DecaySchedule::from_strs(&self.retention.schedule)
            .context("Invalid retention.schedule")?;
        let policy = RetentionPolicy::new(
            schedule,
            self.retention.keep_recent,
            self.retention.max_count,
        )
        .context("Invalid retention settings")?;
        Ok(policy)
    }

    /// Snapshot directory, required by every command
    pub fn snapshot_dir(&self) -> Result<&Path> {
        self.snapshot.directory.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No snapshot directory: pass --dir or set snapshot.directory")
        })
    }

    /// Subvolume to snapshot, required by `run`
    pub fn source(&self) -> Result<&Path> {
        self.snapshot.source.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No source subvolume: pass SOURCE or set snapshot.source")
        })
    }

    /// Check everything that can be checked without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        self.policy()?;
        if self.snapshot.btrfs_bin.as_os_str().is_empty() {
            anyhow::bail!("snapshot.btrfs_bin must not be empty");
        }
        Ok(())
    }
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snapthin").join("config.toml"))
}

/// Load configuration
///
/// An explicit path must exist. The default path is optional: when it is
/// missing, built-in defaults are used.
pub fn load(explicit: Option<&Path>) -> Result<SystemConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(SystemConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration to `path`, creating parent directories
pub fn save(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Write the example configuration to `path` unless a file already exists
///
/// Returns true if a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, example_config())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(true)
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# snapthin configuration

[snapshot]
# Subvolume to snapshot
source = "/home"
# Directory the snapshots are written to (same btrfs filesystem)
directory = "/home/.snapshots"
# btrfs binary
btrfs_bin = "btrfs"

[retention]
# Age boundaries. Everything younger than the first is kept; between two
# boundaries one snapshot is kept per <lower boundary>; nothing is kept
# past the last one, except the newest snapshot.
schedule = ["1h", "1d", "7d", "30d", "365d"]
# Always keep this many of the most recent snapshots
keep_recent = 0
# Upper bound on the number of snapshots kept
# max_count = 500
"#
}
