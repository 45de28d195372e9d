// SPDX-License-Identifier: MIT

//! Orchestrator launch configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Everything one job needs beyond the query/skill pair passed to
/// [`crate::orchestrator::Orchestrator::run_job`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub skill_root: PathBuf,
    pub session_ready_timeout: Duration,
    pub ack_timeout: Duration,
    pub scan_depth: usize,
}

impl OrchestratorConfig {
    pub fn new(skill_root: impl Into<PathBuf>) -> Self {
        Self {
            skill_root: skill_root.into(),
            session_ready_timeout: Duration::from_secs(30),
            ack_timeout: Duration::from_secs(300),
            scan_depth: 3,
        }
    }

    pub fn with_session_ready_timeout(mut self, timeout: Duration) -> Self {
        self.session_ready_timeout = timeout;
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
