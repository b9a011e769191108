//! Snapshot storage for snapthin
//!
//! This crate provides:
//! - The snapshot directory reader (names -> typed snapshot records)
//! - The `SnapshotOps` capability (create/delete one snapshot)
//! - A btrfs implementation driving the `btrfs` command line tool
//! - An in-memory implementation for tests and dry runs

pub mod error;
pub mod memory;
pub mod ops;
pub mod reader;

// Re-exports
pub use error::OpsError;
pub use memory::MemoryOps;
pub use ops::{BtrfsCli, SnapshotOps};
pub use reader::{SnapshotDir, SnapshotEntries, SnapshotListing};

/// Result type for snapshot storage operations
pub type Result<T> = std::result::Result<T, OpsError>;
