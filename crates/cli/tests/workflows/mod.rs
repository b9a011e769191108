//! Workflow integration tests
//!
//! End-to-end runs of the `snapthin` binary against temporary snapshot
//! directories.

pub mod list_plan;
