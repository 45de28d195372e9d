// SPDX-License-Identifier: MIT

//! The closed `error_type` taxonomy shared by results, manifests, and the
//! debug bundle's remediation table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "LOCATOR_FAIL")]
    LocatorFail,
    #[serde(rename = "CONTRACT_INVALID")]
    ContractInvalid,
    #[serde(rename = "SESSION_START_FAIL")]
    SessionStartFail,
    #[serde(rename = "TOOL_CRASH")]
    ToolCrash,
    #[serde(rename = "HEARTBEAT_LOST")]
    HeartbeatLost,
    #[serde(rename = "QUEUE_TIMEOUT")]
    QueueTimeout,
    #[serde(rename = "RESTORE_FAIL")]
    RestoreFail,
    #[serde(rename = "CMD_FAIL")]
    CmdFail,
    #[serde(rename = "OUTPUT_MISSING")]
    OutputMissing,
    #[serde(rename = "OUTPUT_EMPTY")]
    OutputEmpty,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Ok => "OK",
            ErrorType::LocatorFail => "LOCATOR_FAIL",
            ErrorType::ContractInvalid => "CONTRACT_INVALID",
            ErrorType::SessionStartFail => "SESSION_START_FAIL",
            ErrorType::ToolCrash => "TOOL_CRASH",
            ErrorType::HeartbeatLost => "HEARTBEAT_LOST",
            ErrorType::QueueTimeout => "QUEUE_TIMEOUT",
            ErrorType::RestoreFail => "RESTORE_FAIL",
            ErrorType::CmdFail => "CMD_FAIL",
            ErrorType::OutputMissing => "OUTPUT_MISSING",
            ErrorType::OutputEmpty => "OUTPUT_EMPTY",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
