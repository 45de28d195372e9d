// SPDX-License-Identifier: MIT

//! Dual epoch-millisecond / ISO-8601 timestamp parsing.
//!
//! Control-plane timestamps are written as epoch-millisecond strings for
//! machine consumers and as ISO-8601 Z-suffixed strings for humans; both
//! forms must be accepted wherever a timestamp is read back (e.g. a
//! lease's `expires_at`).

use chrono::{DateTime, Utc};

/// Parses a timestamp that is either an epoch-millisecond integer (as a
/// string) or an RFC3339/ISO-8601 string, returning UTC epoch millis.
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Some(millis);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

/// Formats the current instant as an epoch-millisecond string, the
/// canonical on-disk form used for `created_at` / `updated_at` fields.
pub fn now_millis_string() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
