//! snapthin CLI - btrfs snapshot thinning

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmd;

use cmd::RetentionArgs;

/// snapthin - Create btrfs snapshots and thin them out on a decay schedule
#[derive(Parser)]
#[command(name = "snapthin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/snapthin/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a snapshot, then prune
    Run {
        /// Subvolume to snapshot (default: snapshot.source)
        source: Option<PathBuf>,

        #[command(flatten)]
        retention: RetentionArgs,

        /// Show what would happen without creating or deleting anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Prune without creating a snapshot
    Prune {
        #[command(flatten)]
        retention: RetentionArgs,

        /// Show what would be deleted without deleting anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Show the retention plan for the current snapshots
    Plan {
        #[command(flatten)]
        retention: RetentionArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List snapshots
    List {
        /// Snapshot directory (default: snapshot.directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    List,
    /// Show the config file path
    Path {
        /// Write the example configuration if no file exists
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example configuration
    Example,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            source,
            retention,
            dry_run,
        } => cmd::run::run(config, source, retention, dry_run),
        Commands::Prune { retention, dry_run } => cmd::run::prune(config, retention, dry_run),
        Commands::Plan { retention, json } => cmd::plan::run(config, retention, json),
        Commands::List { dir, json } => cmd::list::run(config, dir, json),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(config),
            ConfigCommands::Path { create } => cmd::config::run_path(config, create),
            ConfigCommands::Example => cmd::config::run_example(),
        },
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the verbosity flags. The returned guard flushes the
/// log file on drop and must live until exit.
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match &cli.log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {}", path.display()))?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();

            Ok(None)
        }
    }
}
