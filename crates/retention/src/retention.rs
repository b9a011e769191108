//! Retention policies and the planner

use crate::plan::{DeleteReason, KeepReason, Kept, RetentionPlan, Victim};
use crate::schedule::{Bucket, DecaySchedule, Placement, ScheduleError};
use snap_core::{SnapshotSet, Timestamp};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Policy construction errors
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("max_count must be at least 1")]
    ZeroMaxCount,
}

/// Retention policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Age boundaries controlling thinning density
    pub schedule: DecaySchedule,
    /// Number of most recent snapshots always kept (default: 0)
    pub keep_recent: usize,
    /// Upper bound on kept snapshots (default: unbounded)
    pub max_count: Option<usize>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            schedule: DecaySchedule::default(),
            keep_recent: 0,
            max_count: None,
        }
    }
}

impl RetentionPolicy {
    /// Create a policy, rejecting a zero count cap
    pub fn new(
        schedule: DecaySchedule,
        keep_recent: usize,
        max_count: Option<usize>,
    ) -> Result<Self, PolicyError> {
        if max_count == Some(0) {
            return Err(PolicyError::ZeroMaxCount);
        }
        Ok(Self {
            schedule,
            keep_recent,
            max_count,
        })
    }
}

/// Splits snapshot sets into keep and delete according to a policy
#[derive(Debug, Clone)]
pub struct Planner {
    policy: RetentionPolicy,
}

impl Planner {
    /// Create a planner with the given policy
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    /// The policy this planner applies
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Compute the retention plan for `set` as seen at `now`
    ///
    /// Snapshots are visited newest first. The newest snapshot and the
    /// `keep_recent` most recent ones are always kept, as is everything
    /// younger than the first boundary. Snapshots at or past the horizon
    /// are dropped. In between, the first snapshot visited in each bucket
    /// (the one nearest the bucket's newer edge) is kept and the rest of
    /// the bucket is dropped. Equal timestamps are visited in descending
    /// name order, so the greatest name wins the bucket.
    pub fn plan(&self, set: &SnapshotSet, now: Timestamp) -> RetentionPlan {
        let schedule = &self.policy.schedule;
        let mut keep: Vec<Kept> = Vec::with_capacity(set.len());
        let mut delete: Vec<Victim> = Vec::new();
        let mut claimed: HashMap<Bucket, String> = HashMap::new();

        for (rank, snapshot) in set.iter().rev().enumerate() {
            let age = snapshot.age(now).to_std().unwrap_or(Duration::ZERO);
            let placement = schedule.locate(age);

            let protected = if rank == 0 {
                Some(KeepReason::Newest)
            } else if rank < self.policy.keep_recent {
                Some(KeepReason::KeepRecent)
            } else {
                None
            };

            if let Some(reason) = protected {
                // Protected snapshots still occupy their bucket
                if let Placement::Bucket(bucket) = placement {
                    claimed
                        .entry(bucket)
                        .or_insert_with(|| snapshot.name.clone());
                }
                keep.push(Kept {
                    snapshot: snapshot.clone(),
                    reason,
                });
                continue;
            }

            match placement {
                Placement::Recent => keep.push(Kept {
                    snapshot: snapshot.clone(),
                    reason: KeepReason::Recent,
                }),
                Placement::BeyondHorizon => delete.push(Victim {
                    snapshot: snapshot.clone(),
                    reason: DeleteReason::BeyondHorizon,
                }),
                Placement::Bucket(bucket) => match claimed.entry(bucket) {
                    Entry::Vacant(slot) => {
                        slot.insert(snapshot.name.clone());
                        keep.push(Kept {
                            snapshot: snapshot.clone(),
                            reason: KeepReason::Representative { bucket },
                        });
                    }
                    Entry::Occupied(slot) => delete.push(Victim {
                        snapshot: snapshot.clone(),
                        reason: DeleteReason::Superseded {
                            by: slot.get().clone(),
                        },
                    }),
                },
            }
        }

        if let Some(max_count) = self.policy.max_count {
            enforce_max_count(&mut keep, &mut delete, max_count);
        }

        // Visited newest first; hand back oldest first
        keep.reverse();
        delete.sort_by(|a, b| a.snapshot.cmp(&b.snapshot));

        RetentionPlan { keep, delete }
    }
}

/// Drop the oldest bucket representatives until at most `max_count` remain
///
/// `keep` is ordered newest first. Newest, keep-recent and recent snapshots
/// are never dropped here, so the result may still exceed the cap.
fn enforce_max_count(keep: &mut Vec<Kept>, delete: &mut Vec<Victim>, max_count: usize) {
    let mut excess = keep.len().saturating_sub(max_count);
    let mut idx = keep.len();

    while excess > 0 && idx > 0 {
        idx -= 1;
        if matches!(keep[idx].reason, KeepReason::Representative { .. }) {
            let dropped = keep.remove(idx);
            delete.push(Victim {
                snapshot: dropped.snapshot,
                reason: DeleteReason::OverCount,
            });
            excess -= 1;
        }
    }
}
