//! One create-then-prune cycle
//!
//! Sequence: validate the job, capture "now", create the new snapshot,
//! list the snapshot set, plan, then delete the victims one by one. A
//! failed creation stops the cycle before anything is deleted. A failed
//! deletion is recorded and the remaining deletions still run.

use btrfs::{OpsError, SnapshotListing, SnapshotOps};
use retention::{Planner, RetentionPlan};
use snap_core::{Clock, Snapshot, Timestamp};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What a cycle should do
#[derive(Debug, Clone)]
pub struct Job {
    /// Subvolume to snapshot; `None` prunes without creating
    pub source: Option<PathBuf>,
    /// Directory holding the snapshots
    pub snapshot_dir: PathBuf,
    /// Plan only: no snapshot is created and nothing is deleted
    pub dry_run: bool,
}

/// Errors that abort a cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot creation failed")]
    Create(#[source] OpsError),

    #[error("failed to list snapshots")]
    List(#[source] OpsError),
}

/// A deletion that did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of a cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Reference time used for planning
    pub now: Timestamp,
    /// Snapshot created by this cycle
    pub created: Option<Snapshot>,
    /// The plan that was executed (or would be, for dry runs)
    pub plan: RetentionPlan,
    /// Snapshots actually deleted
    pub deleted: Vec<String>,
    /// Deletions that failed
    pub failed: Vec<DeleteFailure>,
    /// True if nothing was mutated
    pub dry_run: bool,
}

impl CycleReport {
    /// True unless a deletion failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives snapshot creation, planning, and deletion
pub struct Orchestrator<'a> {
    ops: &'a dyn SnapshotOps,
    listing: &'a dyn SnapshotListing,
    clock: &'a dyn Clock,
    planner: Planner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        ops: &'a dyn SnapshotOps,
        listing: &'a dyn SnapshotListing,
        clock: &'a dyn Clock,
        planner: Planner,
    ) -> Self {
        Self {
            ops,
            listing,
            clock,
            planner,
        }
    }

    /// Run one cycle
    pub fn run_cycle(&self, job: &Job) -> Result<CycleReport, CycleError> {
        // 1. Validate before touching anything
        check_dir(&job.snapshot_dir, "snapshot directory")?;
        if let Some(source) = &job.source {
            check_dir(source, "source subvolume")?;
        }

        // 2. Capture reference time
        let now = self.clock.now();

        // 3. Create the new snapshot
        let created = match (&job.source, job.dry_run) {
            (Some(source), false) => {
                let snapshot = self
                    .ops
                    .create(source, &job.snapshot_dir, now)
                    .map_err(CycleError::Create)?;
                info!("Created snapshot {}", snapshot.name);
                Some(snapshot)
            }
            _ => None,
        };

        // 4. List, making sure this cycle's snapshot is part of the set
        let mut set = self.listing.list().map_err(CycleError::List)?;
        if let Some(snapshot) = &created {
            set.insert(snapshot.clone());
        } else if job.source.is_some() {
            // Dry run: plan as if the snapshot had been taken
            set.insert(Snapshot::at(now));
        }

        // 5. Plan
        let plan = self.planner.plan(&set, now);
        debug!(
            "Plan for {} snapshots: keep {}, delete {}",
            set.len(),
            plan.keep().len(),
            plan.delete().len()
        );
        for kept in plan.keep() {
            debug!("keep {} ({})", kept.snapshot.name, kept.reason);
        }
        for victim in plan.delete() {
            debug!("delete {} ({})", victim.snapshot.name, victim.reason);
        }

        // 6. Delete, continuing past failures
        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        if !job.dry_run {
            for victim in plan.delete() {
                let name = &victim.snapshot.name;
                match self.ops.delete(&job.snapshot_dir, name) {
                    Ok(()) => {
                        info!("Deleted snapshot {} ({})", name, victim.reason);
                        deleted.push(name.clone());
                    }
                    Err(e) => {
                        warn!("Failed to delete snapshot {}: {}", name, e);
                        failed.push(DeleteFailure {
                            name: name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(CycleReport {
            now,
            created,
            plan,
            deleted,
            failed,
            dry_run: job.dry_run,
        })
    }
}

fn check_dir(path: &Path, what: &str) -> Result<(), CycleError> {
    if path.is_dir() {
        Ok(())
    } else if path.exists() {
        Err(CycleError::Config(format!(
            "{} {} is not a directory",
            what,
            path.display()
        )))
    } else {
        Err(CycleError::Config(format!(
            "{} {} does not exist",
            what,
            path.display()
        )))
    }
}
