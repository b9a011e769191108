//! Shared utilities for CLI commands

use chrono::Duration;
use owo_colors::OwoColorize;
use retention::RetentionPlan;
use snap_core::{Snapshot, Timestamp};

/// Format an age as relative time ("2 hours ago")
pub fn format_relative_time(ts: Timestamp, now: Timestamp) -> String {
    let seconds = now.signed_duration_since(ts).num_seconds();

    if seconds < 0 {
        "in the future".to_string()
    } else if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format timestamp as absolute time ("2024-01-03 14:30:00 UTC")
pub fn format_absolute_time(ts: Timestamp) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Compact age ("3d 4h", "15m", "42s")
pub fn format_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    let (days, hours, minutes) = (secs / 86400, (secs % 86400) / 3600, (secs % 3600) / 60);

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

/// Print a plan: one line per snapshot, oldest first, with the rule that decided it
pub fn display_plan(plan: &RetentionPlan, now: Timestamp) {
    let mut rows: Vec<(&Snapshot, String, bool)> = plan
        .keep()
        .iter()
        .map(|k| (&k.snapshot, k.reason.to_string(), true))
        .chain(
            plan.delete()
                .iter()
                .map(|v| (&v.snapshot, v.reason.to_string(), false)),
        )
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    for (snapshot, reason, keep) in rows {
        let age = format_age(snapshot.age(now));
        if keep {
            println!(
                "  {} {}  {:>8}  {}",
                "keep  ".green(),
                snapshot.name,
                age.dimmed(),
                reason.dimmed()
            );
        } else {
            println!(
                "  {} {}  {:>8}  {}",
                "delete".red(),
                snapshot.name,
                age.dimmed(),
                reason.yellow()
            );
        }
    }
}
