// SPDX-License-Identifier: MIT

//! The Session Runner (C1): owns a PTY to the tool, polls the run-dir for
//! work and control signals, detects completion via the marker engine,
//! and enforces timeout, cancellation, and lease-based liveness.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use loom_adapters::ToolAdapter;
use loom_core::id::IdGen;
use loom_core::protocol::request::{CancelPolicy, MarkerMode};
use loom_core::protocol::{
    CancelSignal, Lease, Request, ResultStatus, RunnerPhase, SessionResult, State, StopMode,
    StopSignal,
};
use loom_core::time_fmt::now_millis_string;
use loom_core::{ErrorType, ExitReason, MarkerEngine};
use loom_storage::control_plane::{self, ControlPlaneError};
use loom_storage::{FsLock, FsLockError, RunDir};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::RunnerConfig;
use crate::liveness;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
    #[error("tool adapter error: {0}")]
    Tool(#[from] loom_adapters::ToolError),
    #[error("failed to serialize protocol document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("malformed request file {path}: {source}")]
    MalformedRequest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Lock(#[from] FsLockError),
}

/// Outcome of a single iteration of the IDLE poll loop, used to decide
/// whether the main loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Stop,
}

pub struct SessionRunner<A: ToolAdapter> {
    run_dir: RunDir,
    config: RunnerConfig,
    adapter: Arc<A>,
    session_id: String,
    /// Held for the lifetime of the session; released on drop. Answers
    /// the Open Question of whether a second runner could race a
    /// recovering one against the same run-dir.
    lock: Mutex<Option<FsLock>>,
    last_heartbeat: Mutex<Instant>,
}

/// Recovers the inner value from a poisoned mutex rather than panicking;
/// a prior panic while holding these locks does not make the timestamp
/// or the held file lock unusable.
fn lock_ignoring_poison<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poison| poison.into_inner())
}

impl<A: ToolAdapter> SessionRunner<A> {
    pub fn new<I: IdGen>(run_dir: RunDir, config: RunnerConfig, adapter: Arc<A>, id_gen: &I) -> Self {
        let session_id = id_gen.next();
        Self {
            run_dir,
            config,
            adapter,
            session_id,
            lock: Mutex::new(None),
            last_heartbeat: Mutex::new(Instant::now()),
        }
    }

    /// STARTING: open the PTY, run boot commands, publish readiness.
    pub async fn start(&self) -> Result<(), RunnerError> {
        self.run_dir.create_skeleton()?;
        let lock = FsLock::try_acquire(&self.run_dir.runner_lock_file())?;
        *lock_ignoring_poison(&self.lock) = Some(lock);
        self.write_state(RunnerPhase::Starting, None)?;

        self.adapter.spawn(&self.config.argv, &self.config.cwd).await?;
        for boot_command in &self.config.boot_commands {
            let mut payload = boot_command.clone();
            if !payload.ends_with('\n') {
                payload.push('\n');
            }
            self.adapter.write(payload.as_bytes()).await?;
        }

        self.recover_inflight()?;
        self.write_state(RunnerPhase::Idle, None)?;
        control_plane::write_atomic(&self.run_dir.ready_file(), b"ready")?;
        info!(session_id = %self.session_id, "session runner started");
        Ok(())
    }

    /// Any `inflight/` entry found on startup means a previous runner
    /// crashed mid-execution; re-enqueue it rather than attempt a risky
    /// resume, since requests are declared idempotent by their authors.
    fn recover_inflight(&self) -> Result<(), RunnerError> {
        let names = control_plane::list_sorted(&self.run_dir.inflight_dir(), "", ".json")?;
        for name in names {
            let src = self.run_dir.inflight_dir().join(&name);
            let dst = self.run_dir.queue_dir().join(&name);
            warn!(file = %name, "recovering inflight request back to queue");
            control_plane::rename(&src, &dst)?;
        }
        Ok(())
    }

    /// One iteration of the IDLE poll loop: refresh heartbeat, consume
    /// any control signal, and execute at most one queued request.
    pub async fn poll_once(&self) -> Result<LoopSignal, RunnerError> {
        if !self.refresh_heartbeat_if_due()? {
            return Ok(LoopSignal::Stop);
        }

        if let Some(stop) = self.read_stop_signal()? {
            return self.handle_stop(stop).await;
        }

        if self.lease_has_expired()? {
            warn!("lease expired, stopping session");
            self.stop_session().await?;
            return Ok(LoopSignal::Stop);
        }

        if let Some(name) = self.next_queued_request_name()? {
            self.process_one_request(&name).await?;
        }

        Ok(LoopSignal::Continue)
    }

    fn next_queued_request_name(&self) -> Result<Option<String>, RunnerError> {
        let names = control_plane::list_sorted(&self.run_dir.queue_dir(), "cmd_", ".json")?;
        Ok(names.into_iter().next())
    }

    /// Processes one request end to end: idempotency check, queue →
    /// inflight rename, execution, result write, inflight removal.
    async fn process_one_request(&self, file_name: &str) -> Result<(), RunnerError> {
        let queue_path = self.run_dir.queue_dir().join(file_name);
        let raw = match control_plane::read_bytes(&queue_path)? {
            Some(raw) => raw,
            None => return Ok(()),
        };
        let request = Request::from_json(&raw).map_err(|e| RunnerError::MalformedRequest {
            path: queue_path.display().to_string(),
            source: e,
        })?;

        let result_path = self.run_dir.result_dir().join(format!("{}.json", request.request_id));
        if result_path.exists() {
            // Idempotency: a result already exists, discard without
            // re-execution.
            control_plane::remove_if_exists(&queue_path)?;
            return Ok(());
        }

        let inflight_path = self.run_dir.inflight_dir().join(file_name);
        control_plane::rename(&queue_path, &inflight_path)?;
        self.write_state(RunnerPhase::Busy, Some(request.request_id.clone()))?;
        info!(request_id = %request.request_id, seq = request.seq, "executing request");

        let result = self.run_request(&request).await?;

        control_plane::write_atomic(&result_path, &result.to_json()?)?;
        control_plane::remove_if_exists(&inflight_path)?;
        self.write_state(RunnerPhase::Idle, None)?;
        info!(request_id = %request.request_id, status = ?result.status, "request complete");
        Ok(())
    }

    /// The BUSY-phase read loop: §4.1 "Request execution" steps 3-5.
    async fn run_request(&self, request: &Request) -> Result<SessionResult, RunnerError> {
        let started_at = now_millis_string();
        let mut payload = request.payload.clone();
        if matches!(request.marker.mode, MarkerMode::RunnerInject) {
            if !payload.ends_with('\n') {
                payload.push('\n');
            }
            payload.push_str(&format!("puts \"{}\"\n", request.marker_text()));
        }
        self.adapter.write(payload.as_bytes()).await?;

        let mut marker_engine = MarkerEngine::new(&request.marker.prefix, &request.marker.token);
        let deadline = Instant::now() + Duration::from_secs(request.effective_timeout_s());
        let output_path = self.run_dir.output_dir().join(format!("{}.out", request.request_id));
        let mut collected = Vec::new();

        loop {
            if let Some(chunk) = self.adapter.read_chunk().await? {
                collected.extend_from_slice(&chunk);
                control_plane::append_line(
                    &self.run_dir.session_out_log(),
                    &String::from_utf8_lossy(&chunk),
                )?;
                if marker_engine.feed(&chunk) {
                    control_plane::write_atomic(&output_path, &collected)?;
                    return Ok(self.pass_result(request, &started_at, &output_path));
                }
                continue;
            }

            if !self.adapter.is_alive().await? {
                control_plane::write_atomic(&output_path, &collected)?;
                return Ok(self.tool_died_result(request, &started_at, &output_path));
            }

            if let Some(cancel) = self.read_cancel_signal()? {
                if cancel.targets(&request.request_id) {
                    control_plane::remove_if_exists(&self.run_dir.cancel_file())?;
                    self.apply_cancel_policy(request.cancel_policy).await?;
                    control_plane::write_atomic(&output_path, &collected)?;
                    return Ok(self.cancelled_result(
                        request,
                        &started_at,
                        &output_path,
                        ExitReason::CtrlC,
                    ));
                }
            }

            if let Some(stop) = self.read_stop_signal()? {
                if matches!(stop.mode, StopMode::Force) {
                    control_plane::remove_if_exists(&self.run_dir.stop_file())?;
                    self.adapter.kill().await?;
                    control_plane::write_atomic(&output_path, &collected)?;
                    return Ok(self.cancelled_result(
                        request,
                        &started_at,
                        &output_path,
                        ExitReason::StopRequested,
                    ));
                }
            }

            if self.lease_has_expired()? {
                control_plane::write_atomic(&output_path, &collected)?;
                return Ok(self.cancelled_result(
                    request,
                    &started_at,
                    &output_path,
                    ExitReason::LeaseExpired,
                ));
            }

            if Instant::now() >= deadline {
                control_plane::write_atomic(&output_path, &collected)?;
                return Ok(self.timeout_result(request, &started_at, &output_path));
            }

            tokio::time::sleep(self.config.poll_quantum.min(Duration::from_millis(100))).await;
        }
    }

    async fn apply_cancel_policy(&self, policy: CancelPolicy) -> Result<(), RunnerError> {
        match policy {
            CancelPolicy::CtrlC => self.adapter.send_signal_byte(0x03).await?,
            CancelPolicy::TerminateTool => {
                self.adapter.terminate().await?;
                tokio::time::sleep(Duration::from_millis(200)).await;
                if self.adapter.is_alive().await? {
                    self.adapter.kill().await?;
                }
            }
            CancelPolicy::TerminateSession => {
                self.adapter.kill().await?;
                self.write_state(RunnerPhase::Stopping, None)?;
            }
        }
        Ok(())
    }

    fn pass_result(&self, request: &Request, started_at: &str, output_path: &std::path::Path) -> SessionResult {
        SessionResult {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            request_id: request.request_id.clone(),
            job_id: request.job_id.clone(),
            status: ResultStatus::Pass,
            error_type: ErrorType::Ok,
            exit_reason: Some(ExitReason::MarkerSeen),
            message: "marker seen".to_string(),
            started_at: started_at.to_string(),
            finished_at: now_millis_string(),
            output_path: Some(output_path.display().to_string()),
            tail_path: None,
            evidence_paths: Vec::new(),
            stats: None,
        }
    }

    fn timeout_result(&self, request: &Request, started_at: &str, output_path: &std::path::Path) -> SessionResult {
        SessionResult {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            request_id: request.request_id.clone(),
            job_id: request.job_id.clone(),
            status: ResultStatus::Timeout,
            error_type: ErrorType::CmdFail,
            exit_reason: Some(ExitReason::Timeout),
            message: format!("request timed out after {}s", request.effective_timeout_s()),
            started_at: started_at.to_string(),
            finished_at: now_millis_string(),
            output_path: Some(output_path.display().to_string()),
            tail_path: None,
            evidence_paths: Vec::new(),
            stats: None,
        }
    }

    fn cancelled_result(
        &self,
        request: &Request,
        started_at: &str,
        output_path: &std::path::Path,
        exit_reason: ExitReason,
    ) -> SessionResult {
        SessionResult {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            request_id: request.request_id.clone(),
            job_id: request.job_id.clone(),
            status: ResultStatus::Cancelled,
            error_type: ErrorType::CmdFail,
            exit_reason: Some(exit_reason),
            message: "request cancelled".to_string(),
            started_at: started_at.to_string(),
            finished_at: now_millis_string(),
            output_path: Some(output_path.display().to_string()),
            tail_path: None,
            evidence_paths: Vec::new(),
            stats: None,
        }
    }

    fn tool_died_result(&self, request: &Request, started_at: &str, output_path: &std::path::Path) -> SessionResult {
        error!(request_id = %request.request_id, "tool process died mid-request");
        SessionResult {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            request_id: request.request_id.clone(),
            job_id: request.job_id.clone(),
            status: ResultStatus::Fail,
            error_type: ErrorType::ToolCrash,
            exit_reason: Some(ExitReason::ToolDied),
            message: "tool process is no longer alive".to_string(),
            started_at: started_at.to_string(),
            finished_at: now_millis_string(),
            output_path: Some(output_path.display().to_string()),
            tail_path: None,
            evidence_paths: Vec::new(),
            stats: None,
        }
    }

    async fn handle_stop(&self, stop: StopSignal) -> Result<LoopSignal, RunnerError> {
        control_plane::remove_if_exists(&self.run_dir.stop_file())?;
        match stop.mode {
            StopMode::Graceful | StopMode::Force => {
                self.stop_session().await?;
            }
        }
        Ok(LoopSignal::Stop)
    }

    /// STOPPING: close out the tool process and flush state.
    pub async fn stop_session(&self) -> Result<(), RunnerError> {
        self.write_state(RunnerPhase::Stopping, None)?;
        self.adapter.terminate().await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
        if self.adapter.is_alive().await.unwrap_or(false) {
            self.adapter.kill().await?;
        }
        Ok(())
    }

    fn read_cancel_signal(&self) -> Result<Option<CancelSignal>, ControlPlaneError> {
        control_plane::read_json(&self.run_dir.cancel_file())
    }

    fn read_stop_signal(&self) -> Result<Option<StopSignal>, ControlPlaneError> {
        control_plane::read_json(&self.run_dir.stop_file())
    }

    fn lease_has_expired(&self) -> Result<bool, ControlPlaneError> {
        if !self.config.enable_lease {
            return Ok(false);
        }
        let lease: Option<Lease> = control_plane::read_json(&self.run_dir.lease_file())?;
        Ok(liveness::lease_expired(lease.as_ref(), chrono::Utc::now().timestamp_millis()))
    }

    /// Refreshes `state/heartbeat` no less often than `heartbeat_interval`.
    /// Returns `false` if the runner has gone more than twice that
    /// interval without a successful refresh (a local filesystem stall),
    /// in which case the caller must transition to STOPPING.
    fn refresh_heartbeat_if_due(&self) -> Result<bool, RunnerError> {
        let now = Instant::now();
        let last = *lock_ignoring_poison(&self.last_heartbeat);
        if !liveness::heartbeat_due(last, now, self.config.heartbeat_interval) {
            return Ok(true);
        }

        match control_plane::write_atomic(
            &self.run_dir.heartbeat_file(),
            format!("{{\"timestamp\":\"{}\"}}", now_millis_string()).as_bytes(),
        ) {
            Ok(()) => {
                *lock_ignoring_poison(&self.last_heartbeat) = now;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "heartbeat refresh failed");
                if liveness::heartbeat_self_stalled(last, now, self.config.heartbeat_interval) {
                    error!("heartbeat self-stall exceeded twice the refresh interval, entering ERROR");
                    self.write_state(RunnerPhase::Error, None)?;
                    return Ok(false);
                }
                Ok(true)
            }
        }
    }

    fn write_state(&self, phase: RunnerPhase, current_request_id: Option<String>) -> Result<(), RunnerError> {
        let state = State {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            phase,
            session_id: self.session_id.clone(),
            runner_pid: std::process::id(),
            tool_pid: None,
            current_request_id,
            updated_at: now_millis_string(),
        };
        let bytes = state.to_json()?;
        control_plane::write_atomic(&self.run_dir.state_file(), &bytes)?;
        control_plane::write_atomic(&self.run_dir.session_state_file(), &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
