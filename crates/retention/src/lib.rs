//! Retention planning for snapshot sets
//!
//! This crate provides:
//! - Decay schedules (strictly increasing age boundaries)
//! - Retention policies (schedule + keep-recent floor + count cap)
//! - The planner that splits a snapshot set into keep and delete
//!
//! Planning is pure: no I/O, no clock reads. The caller supplies "now".

pub mod plan;
pub mod retention;
pub mod schedule;

// Re-exports
pub use plan::{DeleteReason, KeepReason, Kept, RetentionPlan, Victim};
pub use retention::{Planner, PolicyError, RetentionPolicy};
pub use schedule::{Bucket, DecaySchedule, Placement, ScheduleError};
