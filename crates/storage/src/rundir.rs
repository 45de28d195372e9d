// SPDX-License-Identifier: MIT

//! The run-dir layout: a typed view over the fixed directory skeleton
//! every job and session shares.

use std::path::{Path, PathBuf};

use crate::control_plane::ControlPlaneError;

/// A self-contained filesystem subtree, opened by exactly one
/// orchestrator and, during an active session, exactly one runner.
#[derive(Debug, Clone)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.root.join("queue")
    }

    pub fn inflight_dir(&self) -> PathBuf {
        self.root.join("inflight")
    }

    pub fn result_dir(&self) -> PathBuf {
        self.root.join("result")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn session_out_log(&self) -> PathBuf {
        self.root.join("log").join("session.out")
    }

    pub fn ctl_dir(&self) -> PathBuf {
        self.root.join("ctl")
    }

    pub fn cancel_file(&self) -> PathBuf {
        self.ctl_dir().join("cancel.json")
    }

    pub fn stop_file(&self) -> PathBuf {
        self.ctl_dir().join("stop.json")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir().join("state.json")
    }

    pub fn heartbeat_file(&self) -> PathBuf {
        self.state_dir().join("heartbeat.json")
    }

    pub fn lease_file(&self) -> PathBuf {
        self.state_dir().join("lease.json")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn session_dir(&self) -> PathBuf {
        self.root.join("session")
    }

    pub fn supervisor_log(&self) -> PathBuf {
        self.session_dir().join("supervisor.log")
    }

    pub fn session_state_file(&self) -> PathBuf {
        self.session_dir().join("state.json")
    }

    pub fn ready_file(&self) -> PathBuf {
        self.session_dir().join("ready")
    }

    pub fn runner_lock_file(&self) -> PathBuf {
        self.session_dir().join("runner.lock")
    }

    pub fn job_manifest_file(&self) -> PathBuf {
        self.root.join("job_manifest.json")
    }

    pub fn contract_file(&self) -> PathBuf {
        self.root.join("contract.yaml")
    }

    pub fn job_timeline_file(&self) -> PathBuf {
        self.root.join("job_timeline.jsonl")
    }

    pub fn summary_json_file(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    pub fn summary_md_file(&self) -> PathBuf {
        self.root.join("summary.md")
    }

    pub fn debug_bundle_dir(&self) -> PathBuf {
        self.root.join("debug_bundle")
    }

    /// Creates every directory in the skeleton (files are written lazily
    /// by the components that own them).
    pub fn create_skeleton(&self) -> Result<(), ControlPlaneError> {
        for dir in [
            self.scripts_dir(),
            self.queue_dir(),
            self.inflight_dir(),
            self.result_dir(),
            self.output_dir(),
            self.session_out_log()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.join("log")),
            self.ctl_dir(),
            self.state_dir(),
            self.reports_dir(),
            self.session_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| ControlPlaneError::Io {
                path: dir,
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "rundir_tests.rs"]
mod tests;
