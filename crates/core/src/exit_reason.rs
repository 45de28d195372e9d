// SPDX-License-Identifier: MIT

//! The closed set of reasons a request or session stops running.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    MarkerSeen,
    CtrlC,
    Timeout,
    ToolDied,
    StopRequested,
    LeaseExpired,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::MarkerSeen => "marker_seen",
            ExitReason::CtrlC => "ctrl_c",
            ExitReason::Timeout => "timeout",
            ExitReason::ToolDied => "tool_died",
            ExitReason::StopRequested => "stop_requested",
            ExitReason::LeaseExpired => "lease_expired",
        }
    }
}

#[cfg(test)]
#[path = "exit_reason_tests.rs"]
mod tests;
