// SPDX-License-Identifier: MIT

//! Pure liveness calculations: heartbeat refresh cadence and lease
//! expiry. Kept free of I/O so they can be tested with a `FakeClock`.

use std::time::{Duration, Instant};

use loom_core::protocol::Lease;

/// Whether the heartbeat file is due for a refresh.
pub fn heartbeat_due(last_refresh: Instant, now: Instant, interval: Duration) -> bool {
    now.saturating_duration_since(last_refresh) >= interval
}

/// Whether the runner itself has gone too long without refreshing its
/// own heartbeat (a local filesystem stall), per the Open Question
/// resolution: the runner self-checks this and transitions to ERROR.
pub fn heartbeat_self_stalled(last_refresh: Instant, now: Instant, interval: Duration) -> bool {
    now.saturating_duration_since(last_refresh) >= interval * 2
}

/// Whether a present lease has expired as of `now_millis`. Absence of a
/// lease (`None`) is never expiry.
pub fn lease_expired(lease: Option<&Lease>, now_millis: i64) -> bool {
    lease.is_some_and(|l| l.is_expired(now_millis))
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
