// SPDX-License-Identifier: MIT

//! The Request entity: one immutable unit of work placed into `queue/`.

use serde::{Deserialize, Serialize};

use super::{check_schema_version, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    CtrlC,
    TerminateTool,
    TerminateSession,
}

impl Default for CancelPolicy {
    fn default() -> Self {
        CancelPolicy::CtrlC
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerMode {
    RunnerInject,
    PayloadContains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub prefix: String,
    pub token: String,
    pub mode: MarkerMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub request_id: String,
    pub job_id: String,
    pub seq: u64,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<u64>,
    #[serde(default)]
    pub cancel_policy: CancelPolicy,
    pub marker: Marker,
    pub created_at: String,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_kind() -> String {
    "tcl".to_string()
}

impl Request {
    /// Default per-request timeout when none is specified, per §4.1.
    pub const DEFAULT_TIMEOUT_S: u64 = 300;

    pub fn effective_timeout_s(&self) -> u64 {
        self.timeout_s.unwrap_or(Self::DEFAULT_TIMEOUT_S)
    }

    /// The run-dir file name for this request under `queue/`/`inflight/`.
    pub fn file_name(&self) -> String {
        format!("cmd_{}_{}.json", self.seq, self.request_id)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let req: Self = serde_json::from_slice(bytes)?;
        check_schema_version(&req.schema_version, "Request");
        Ok(req)
    }

    /// The literal marker text the runner expects the tool to echo back.
    pub fn marker_text(&self) -> String {
        format!("{} {}", self.marker.prefix, self.marker.token)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
