// SPDX-License-Identifier: MIT

//! The Lease entity: orchestrator-written, runner-read time-bounded
//! permission to stay alive.

use serde::{Deserialize, Serialize};

use crate::time_fmt::parse_timestamp_millis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub lease_id: String,
    pub expires_at: String,
    pub owner: String,
}

impl Lease {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// `expires_at` accepts epoch-ms or ISO-8601; an unparseable value is
    /// treated as already expired, the conservative choice.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        match parse_timestamp_millis(&self.expires_at) {
            Some(expires) => now_millis >= expires,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
