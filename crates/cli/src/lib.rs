//! snapthin library surface
//!
//! Configuration, locking, and the create-then-prune orchestrator. The
//! `snapthin` binary is a thin clap front end over these modules.

pub mod config;
pub mod locks;
pub mod orchestrator;
pub mod util;

pub use orchestrator::{CycleError, CycleReport, DeleteFailure, Job, Orchestrator};
