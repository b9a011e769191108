//! Clock abstraction
//!
//! "Now" is always passed in explicitly so planning never reads the wall
//! clock on its own.

use crate::Timestamp;
use chrono::{SubsecRound, Utc};

/// Source of the current time
pub trait Clock {
    /// Current time, truncated to whole seconds
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().trunc_subsecs(0)
    }
}

/// Clock frozen at a fixed instant, for tests and dry runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: Timestamp,
}

impl FixedClock {
    /// Create a clock that always reports `now`
    pub fn new(now: Timestamp) -> Self {
        Self { now: now.trunc_subsecs(0) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}
