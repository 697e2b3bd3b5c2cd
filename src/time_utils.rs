// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar day (`YYYY-MM-DD`) of an RFC3339 timestamp, or `None` if the
/// string does not parse.
pub fn day_of(start_date: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(start_date)
        .ok()
        .map(|dt| dt.date_naive().to_string())
}

/// Format a duration given in minutes as `"1h 04min"`, or `"34 min"` when
/// under an hour.
pub fn format_minutes(minutes: f64) -> String {
    let mut hours = (minutes / 60.0).floor() as i64;
    let mut mins = (minutes % 60.0).round() as i64;
    if mins == 60 {
        hours += 1;
        mins = 0;
    }
    if hours > 0 {
        format!("{}h {:02}min", hours, mins)
    } else {
        format!("{:02} min", mins)
    }
}
