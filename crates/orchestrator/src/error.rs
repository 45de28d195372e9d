// SPDX-License-Identifier: MIT

//! The orchestrator's fallible operations, each carrying the `ErrorType`
//! that propagates into the manifest and debug bundle.

use loom_core::ErrorType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    ControlPlane(#[from] loom_storage::ControlPlaneError),
    #[error("failed to serialize protocol document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to parse contract: {0}")]
    ContractYaml(#[from] serde_yaml::Error),
    #[error("failed to spawn session runner: {0}")]
    Spawn(std::io::Error),
    #[error("session never published session/ready within {0:?}")]
    SessionStartTimeout(std::time::Duration),
    #[error("no result for request {request_id} within {timeout:?}")]
    AckTimeout {
        request_id: String,
        timeout: std::time::Duration,
    },
}

impl OrchestratorError {
    /// Maps an internal failure to the closed `error_type` taxonomy that
    /// flows into the manifest and debug bundle, per spec.md §7.
    pub fn error_type(&self) -> ErrorType {
        match self {
            OrchestratorError::SessionStartTimeout(_) | OrchestratorError::Spawn(_) => {
                ErrorType::SessionStartFail
            }
            OrchestratorError::AckTimeout { .. } => ErrorType::QueueTimeout,
            OrchestratorError::ControlPlane(_)
            | OrchestratorError::Serialize(_)
            | OrchestratorError::ContractYaml(_) => ErrorType::CmdFail,
        }
    }
}
