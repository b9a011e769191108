//! Decay schedules
//!
//! A schedule is a list of age boundaries `b[0] < b[1] < ... < b[n-1]`.
//! Snapshots younger than `b[0]` are all kept, snapshots at or beyond
//! `b[n-1]` (the horizon) are dropped, and tier `i` (`b[i-1] <= age < b[i]`)
//! keeps one snapshot per `b[i-1]`-wide slot.
//!
//! `[1h, 1d, 7d]` reads as: keep everything from the last hour, one per
//! hour for a day, one per day for a week, nothing older.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Schedule construction errors
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule has no boundaries")]
    Empty,

    #[error("boundary {index} is zero")]
    Zero { index: usize },

    #[error("boundary {index} has a sub-second part ({value:?}); use whole seconds")]
    SubSecond { index: usize, value: Duration },

    #[error("boundaries must be strictly increasing: boundary {index} ({current}) is not greater than {previous}")]
    NotIncreasing {
        index: usize,
        previous: String,
        current: String,
    },

    #[error("invalid duration '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: humantime::DurationError,
    },
}

/// Where an age falls within a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Younger than the first boundary
    Recent,
    /// Inside a tier
    Bucket(Bucket),
    /// At or beyond the horizon
    BeyondHorizon,
}

/// One retention bucket: a slot within a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Bucket {
    /// Tier index, starting at 1 (`b[tier-1] <= age < b[tier]`)
    pub tier: usize,
    /// `age / b[tier-1]`, counted from now
    pub slot: u64,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} slot {}", self.tier, self.slot)
    }
}

/// Validated, immutable decay schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecaySchedule {
    boundaries: Vec<Duration>,
}

impl DecaySchedule {
    /// Build a schedule from boundaries
    ///
    /// Fails unless boundaries are non-empty, non-zero, whole seconds and
    /// strictly increasing.
    pub fn new(boundaries: Vec<Duration>) -> Result<Self, ScheduleError> {
        if boundaries.is_empty() {
            return Err(ScheduleError::Empty);
        }

        for (index, &value) in boundaries.iter().enumerate() {
            if value.is_zero() {
                return Err(ScheduleError::Zero { index });
            }
            if value.subsec_nanos() != 0 {
                return Err(ScheduleError::SubSecond { index, value });
            }
            if index > 0 && value <= boundaries[index - 1] {
                return Err(ScheduleError::NotIncreasing {
                    index,
                    previous: humantime::format_duration(boundaries[index - 1]).to_string(),
                    current: humantime::format_duration(value).to_string(),
                });
            }
        }

        Ok(Self { boundaries })
    }

    /// Parse a comma-separated list such as `1h,1d,7d`
    pub fn parse(list: &str) -> Result<Self, ScheduleError> {
        let items: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        Self::from_strs(&items)
    }

    /// Parse each item as a humantime duration (`90m`, `1d`, `2weeks`)
    pub fn from_strs<S: AsRef<str>>(items: &[S]) -> Result<Self, ScheduleError> {
        let boundaries = items
            .iter()
            .map(|item| {
                let input = item.as_ref().trim();
                humantime::parse_duration(input).map_err(|source| ScheduleError::Parse {
                    input: input.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(boundaries)
    }

    /// Boundaries, ascending
    pub fn boundaries(&self) -> &[Duration] {
        &self.boundaries
    }

    /// Age below which everything is kept
    pub fn recent_window(&self) -> Duration {
        self.boundaries[0]
    }

    /// Age at or beyond which snapshots are dropped
    pub fn horizon(&self) -> Duration {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Locate an age within the schedule
    pub fn locate(&self, age: Duration) -> Placement {
        if age < self.recent_window() {
            return Placement::Recent;
        }
        if age >= self.horizon() {
            return Placement::BeyondHorizon;
        }

        // First boundary strictly greater than age; never 0 or len here
        let tier = self.boundaries.partition_point(|&b| b <= age);
        let width = self.boundaries[tier - 1].as_secs();

        Placement::Bucket(Bucket {
            tier,
            slot: age.as_secs() / width,
        })
    }
}

impl Default for DecaySchedule {
    /// Hourly for a day, daily for a week, weekly for a month, monthly for a year
    fn default() -> Self {
        const HOUR: u64 = 60 * 60;
        const DAY: u64 = 24 * HOUR;
        Self {
            boundaries: vec![
                Duration::from_secs(HOUR),
                Duration::from_secs(DAY),
                Duration::from_secs(7 * DAY),
                Duration::from_secs(30 * DAY),
                Duration::from_secs(365 * DAY),
            ],
        }
    }
}

impl fmt::Display for DecaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.boundaries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", compact(*b))?;
        }
        Ok(())
    }
}

/// Boundaries are whole seconds, so the largest unit that divides evenly is exact
fn compact(d: Duration) -> String {
    let secs = d.as_secs();
    for (unit, suffix) in [(86_400, "d"), (3_600, "h"), (60, "m")] {
        if secs % unit == 0 {
            return format!("{}{}", secs / unit, suffix);
        }
    }
    format!("{}s", secs)
}
