// SPDX-License-Identifier: MIT

//! The Result entity: one runner response, written at most once per
//! `request_id`.

use serde::{Deserialize, Serialize};

use crate::error::ErrorType;
use crate::exit_reason::ExitReason;

use super::{check_schema_version, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Pass,
    Fail,
    Timeout,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub request_id: String,
    pub job_id: String,
    pub status: ResultStatus,
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    pub message: String,
    pub started_at: String,
    pub finished_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence_paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl SessionResult {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.request_id)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let result: Self = serde_json::from_slice(bytes)?;
        check_schema_version(&result.schema_version, "Result");
        Ok(result)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.status, ResultStatus::Pass)
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
