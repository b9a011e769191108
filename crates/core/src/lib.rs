//! Core types for snapthin
//!
//! This crate provides:
//! - Snapshot records (name + UTC timestamp)
//! - Ordered snapshot sets with deterministic tie-breaking
//! - The `YYYYMMDDHHMMSS` naming convention
//! - An injectable clock

pub mod clock;
pub mod naming;
pub mod snapshot;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use naming::{format_name, parse_name, NameError};
pub use snapshot::{Snapshot, SnapshotSet};

/// Timestamp type used across the workspace (UTC, second resolution)
pub type Timestamp = chrono::DateTime<chrono::Utc>;
