//! Snapshot naming convention
//!
//! Snapshot names are the UTC creation time written as `YYYYMMDDHHMMSS`.
//! The name is the only state carried between runs, so `parse_name` must
//! accept exactly what `format_name` produces.

use crate::Timestamp;
use chrono::{Datelike, NaiveDate, TimeZone, Timelike, Utc};
use thiserror::Error;

/// Length of a snapshot name in bytes
pub const NAME_LEN: usize = 14;

/// Why a directory entry is not a snapshot name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("expected {NAME_LEN} characters, found {0}")]
    Length(usize),

    #[error("name contains non-digit characters")]
    NonNumeric,

    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}

/// Format a timestamp as a snapshot name
pub fn format_name(ts: Timestamp) -> String {
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

/// Parse a snapshot name back into its timestamp
pub fn parse_name(name: &str) -> Result<Timestamp, NameError> {
    if name.len() != NAME_LEN {
        return Err(NameError::Length(name.len()));
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NameError::NonNumeric);
    }

    // All digits, so every slice below is valid UTF-8 and parses
    let field = |range: std::ops::Range<usize>| -> u32 {
        name[range].parse().unwrap_or(u32::MAX)
    };

    let year = field(0..4) as i32;
    let (month, day) = (field(4..6), field(6..8));
    let (hour, minute, second) = (field(8..10), field(10..12), field(12..14));

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| NameError::OutOfRange(name.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive))
}
