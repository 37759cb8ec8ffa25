// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z`
/// suffix. Fixed width, so stored values sort lexically by time.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in the stored timestamp format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Render a stored timestamp for display as `MM/DD/YYYY, HH:MM` (24h, local
/// time). Unparseable input is returned unchanged.
pub fn format_display(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date
            .with_timezone(&Local)
            .format("%m/%d/%Y, %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
