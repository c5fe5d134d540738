// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, FixedOffset};

/// Split an event timestamp into the feed's date and time columns
/// (`dd/mm/yyyy`, `HH:MM:SS`), in the device's own offset.
pub fn display_date_time(timestamp: Option<&DateTime<FixedOffset>>) -> (String, String) {
    match timestamp {
        Some(ts) => (
            ts.format("%d/%m/%Y").to_string(),
            ts.format("%H:%M:%S").to_string(),
        ),
        None => ("(no date)".to_string(), "--:--:--".to_string()),
    }
}
