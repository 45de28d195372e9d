// SPDX-License-Identifier: MIT

//! The Manifest entity: per-job single-source-of-truth, overwritten
//! atomically on each orchestrator phase transition.

use serde::{Deserialize, Serialize};

use crate::error::ErrorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestratorPhase {
    PrepareRundir,
    LocateDb,
    StartSession,
    RestoreDb,
    RunSkill,
    ValidateOutputs,
    Summarize,
    Done,
    Fail,
    NeedsSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Running,
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub job_id: String,
    pub run_dir: String,
    pub phase: OrchestratorPhase,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_data_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Manifest {
    pub fn new(job_id: impl Into<String>, run_dir: impl Into<String>, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            job_id: job_id.into(),
            run_dir: run_dir.into(),
            phase: OrchestratorPhase::PrepareRundir,
            status: JobStatus::Running,
            error_type: None,
            design: None,
            design_data_path: None,
            skill: None,
            updated_at: created_at.clone(),
            created_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
