// SPDX-License-Identifier: MIT

//! The State entity: the runner's phase, overwritten atomically on every
//! phase change.

use serde::{Deserialize, Serialize};

use super::{check_schema_version, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunnerPhase {
    Starting,
    Idle,
    Busy,
    Error,
    Stopping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub phase: RunnerPhase,
    pub session_id: String,
    pub runner_pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_request_id: Option<String>,
    pub updated_at: String,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl State {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let state: Self = serde_json::from_slice(bytes)?;
        check_schema_version(&state.schema_version, "State");
        Ok(state)
    }

    /// Invariant from the data model: `phase=BUSY` implies a non-empty
    /// `current_request_id`.
    pub fn is_consistent(&self) -> bool {
        match self.phase {
            RunnerPhase::Busy => self
                .current_request_id
                .as_ref()
                .is_some_and(|id| !id.is_empty()),
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
