// SPDX-License-Identifier: MIT

//! The Orchestrator (C4): the per-job state machine that drives one run
//! from `PREPARE_RUNDIR` through `DONE` or `FAIL`, per spec.md §4.4.
//!
//! Grounded in `original_source/skillpilot/orchestrator/__init__.py`'s
//! `run_job`: the same state sequence, the same "generate a debug bundle
//! and stop the session on every terminal failure" discipline, and the
//! same `NEEDS_SELECTION` resumability.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use loom_core::id::IdGen;
use loom_core::protocol::manifest::{JobStatus, OrchestratorPhase as ManifestPhase};
use loom_core::protocol::request::{CancelPolicy, Marker, MarkerMode};
use loom_core::protocol::summary::Summary;
use loom_core::protocol::timeline::{TimelineEntry, TimelineEvent, TimelineLevel};
use loom_core::protocol::{Contract, Manifest, Request};
use loom_core::time_fmt::now_millis_string;
use loom_core::{ErrorType, UuidIdGen};
use loom_storage::control_plane;
use loom_storage::timeline_writer::TimelineWriter;
use loom_storage::RunDir;
use tracing::{info, warn};

use crate::config::OrchestratorConfig;
use crate::contract_validator::{self, OutputCheck};
use crate::debug_bundle::DebugBundleBuilder;
use crate::locator::{Candidate, LocateOutcome, Locator};
use crate::supervisor::{SessionHandle, SessionLaunch, SessionSupervisor};

/// A caller-resolved choice among `LocateOutcome::NeedsSelection`
/// candidates, re-submitted via [`Orchestrator::resume_with_selection`].
#[derive(Debug, Clone)]
pub struct UserSelection {
    pub design_path: PathBuf,
    pub design_data_path: PathBuf,
}

/// The terminal (or pausing) outcome of one `run_job` / `resume_with_selection` call.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Pass,
    Fail(ErrorType),
    NeedsSelection(Vec<Candidate>),
}

#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: String,
    pub run_dir: PathBuf,
    pub outcome: JobOutcome,
}

enum AwaitError {
    Timeout,
}

/// Runs one job end to end against one run-dir per invocation.
pub struct Orchestrator<S: SessionSupervisor, I: IdGen = UuidIdGen> {
    cwd: PathBuf,
    runs_root: PathBuf,
    config: OrchestratorConfig,
    supervisor: Arc<S>,
    id_gen: I,
}

impl<S: SessionSupervisor> Orchestrator<S, UuidIdGen> {
    pub fn new(cwd: impl Into<PathBuf>, config: OrchestratorConfig, supervisor: Arc<S>) -> Self {
        Self::with_id_gen(cwd, config, supervisor, UuidIdGen)
    }
}

impl<S: SessionSupervisor, I: IdGen> Orchestrator<S, I> {
    /// Constructs an orchestrator with an injectable id generator, so
    /// tests can drive deterministic job/request ids.
    pub fn with_id_gen(
        cwd: impl Into<PathBuf>,
        config: OrchestratorConfig,
        supervisor: Arc<S>,
        id_gen: I,
    ) -> Self {
        let cwd = cwd.into();
        let runs_root = cwd.join(".loom").join("runs");
        Self {
            cwd,
            runs_root,
            config,
            supervisor,
            id_gen,
        }
    }

    /// Runs a full job: locate the design, validate the skill's contract,
    /// start a session, restore the design, run the skill, validate its
    /// outputs, and summarize. Returns `NeedsSelection` without touching
    /// a session if the design query is ambiguous.
    pub async fn run_job(&self, design_query: &str, skill_name: &str) -> JobResult {
        self.run_job_inner(design_query, skill_name, None).await
    }

    /// Re-invokes a job that previously returned `NeedsSelection`, with
    /// the caller's chosen candidate.
    pub async fn resume_with_selection(
        &self,
        design_query: &str,
        skill_name: &str,
        selection: UserSelection,
    ) -> JobResult {
        self.run_job_inner(design_query, skill_name, Some(selection))
            .await
    }

    async fn run_job_inner(
        &self,
        design_query: &str,
        skill_name: &str,
        selection: Option<UserSelection>,
    ) -> JobResult {
        let run_dir = match self.create_run_dir() {
            Ok(run_dir) => run_dir,
            Err(e) => {
                warn!(error = %e, "failed to create run dir");
                return JobResult {
                    job_id: "unknown".to_string(),
                    run_dir: PathBuf::new(),
                    outcome: JobOutcome::Fail(ErrorType::SessionStartFail),
                };
            }
        };
        let job_id = run_dir
            .root()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        let timeline = TimelineWriter::new(run_dir.job_timeline_file());

        let mut manifest = Manifest::new(
            job_id.clone(),
            run_dir.root().display().to_string(),
            now_millis_string(),
        );
        let _ = write_manifest(&run_dir, &manifest);

        tl_state_enter(&timeline, &job_id, "PREPARE_RUNDIR");
        tl_state_exit(&timeline, &job_id, "PREPARE_RUNDIR");

        // LOCATE_DB
        tl_state_enter(&timeline, &job_id, "LOCATE_DB");
        manifest.phase = ManifestPhase::LocateDb;
        let locator = Locator::new(&self.cwd, self.config.scan_depth);

        let (design_path, design_data_path) = match selection {
            Some(sel) => (sel.design_path, sel.design_data_path),
            None => match locator.locate(design_query) {
                LocateOutcome::Found {
                    design_path,
                    design_data_path,
                    ..
                } => (design_path, design_data_path),
                LocateOutcome::NeedsSelection { candidates } => {
                    manifest.phase = ManifestPhase::NeedsSelection;
                    let _ = write_manifest(&run_dir, &manifest);
                    return JobResult {
                        job_id,
                        run_dir: run_dir.root().to_path_buf(),
                        outcome: JobOutcome::NeedsSelection(candidates),
                    };
                }
                LocateOutcome::Fail { reason } => {
                    tl_fail(&timeline, &job_id, "LOCATOR_FAIL", reason);
                    return self.fail(
                        run_dir,
                        job_id,
                        &mut manifest,
                        ErrorType::LocatorFail,
                        &format!("DB locator failed: {reason}"),
                        None,
                        None,
                    );
                }
            },
        };
        manifest.design = Some(design_path.display().to_string());
        manifest.design_data_path = Some(design_data_path.display().to_string());
        tl_state_exit(&timeline, &job_id, "LOCATE_DB");

        // Contract load + static validation
        let contract_path = self.config.skill_root.join(skill_name).join("contract.yaml");
        let contract = match load_contract(&contract_path) {
            Ok(contract) => contract,
            Err(msg) => {
                tl_fail(&timeline, &job_id, "CONTRACT_INVALID", &msg);
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    ErrorType::ContractInvalid,
                    &format!("Contract load failed: {msg}"),
                    None,
                    Some(&contract_path),
                );
            }
        };
        if let Err(msg) = contract_validator::validate_static(&contract) {
            tl_fail(&timeline, &job_id, "CONTRACT_INVALID", &msg);
            return self.fail(
                run_dir,
                job_id,
                &mut manifest,
                ErrorType::ContractInvalid,
                &format!("Contract invalid: {msg}"),
                None,
                Some(&contract_path),
            );
        }
        manifest.skill = Some(skill_name.to_string());

        // START_SESSION
        tl_state_enter(&timeline, &job_id, "START_SESSION");
        manifest.phase = ManifestPhase::StartSession;
        let launch = SessionLaunch {
            argv: vec!["tool".to_string()],
            cwd: self.cwd.clone(),
            boot_commands: Vec::new(),
            heartbeat_interval: Duration::from_secs(5),
            enable_lease: true,
        };
        let mut handle = match self.start_session(&run_dir, &launch).await {
            Ok(handle) => handle,
            Err(msg) => {
                tl_fail(&timeline, &job_id, "SESSION_START_FAIL", &msg);
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    ErrorType::SessionStartFail,
                    &format!("Session start failed: {msg}"),
                    None,
                    None,
                );
            }
        };
        tl_state_exit(&timeline, &job_id, "START_SESSION");

        // RESTORE_DB
        tl_state_enter(&timeline, &job_id, "RESTORE_DB");
        manifest.phase = ManifestPhase::RestoreDb;
        let restore_payload = format!("restore_design {}\n", design_data_path.display());
        tl_action(&timeline, &job_id, "submit_request", "restore_wrapper");
        let restore_result = self
            .submit_and_await(&run_dir, &job_id, 1, &restore_payload)
            .await;
        tl_action(&timeline, &job_id, "receive_ack", "restore_wrapper");

        match restore_result {
            Ok(result) if result.is_pass() => {}
            Ok(result) => {
                tl_fail(&timeline, &job_id, result.error_type.as_str(), &result.message);
                let last_fail = run_dir.result_dir().join(result.file_name());
                handle.stop().await;
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    result.error_type,
                    &format!("Restore failed: {}", result.message),
                    Some(&last_fail),
                    None,
                );
            }
            Err(AwaitError::Timeout) => {
                tl_fail(&timeline, &job_id, "QUEUE_TIMEOUT", "Restore request timeout");
                handle.stop().await;
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    ErrorType::QueueTimeout,
                    "Restore request timeout",
                    None,
                    None,
                );
            }
        }
        tl_state_exit(&timeline, &job_id, "RESTORE_DB");

        // RUN_SKILL
        tl_state_enter(&timeline, &job_id, "RUN_SKILL");
        manifest.phase = ManifestPhase::RunSkill;
        let skill_payload = format!("poke::run -skill {skill_name}\n");
        let skill_label = format!("run_{skill_name}");
        tl_action(&timeline, &job_id, "submit_request", &skill_label);
        let skill_result = self
            .submit_and_await(&run_dir, &job_id, 2, &skill_payload)
            .await;
        tl_action(&timeline, &job_id, "receive_ack", &skill_label);

        match skill_result {
            Ok(result) if result.is_pass() => {}
            Ok(result) => {
                tl_fail(&timeline, &job_id, result.error_type.as_str(), &result.message);
                let last_fail = run_dir.result_dir().join(result.file_name());
                handle.stop().await;
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    result.error_type,
                    &format!("Skill execution failed: {}", result.message),
                    Some(&last_fail),
                    None,
                );
            }
            Err(AwaitError::Timeout) => {
                tl_fail(&timeline, &job_id, "QUEUE_TIMEOUT", "Skill request timeout");
                handle.stop().await;
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    ErrorType::QueueTimeout,
                    "Skill request timeout",
                    None,
                    None,
                );
            }
        }
        tl_state_exit(&timeline, &job_id, "RUN_SKILL");

        // VALIDATE_OUTPUTS
        tl_state_enter(&timeline, &job_id, "VALIDATE_OUTPUTS");
        manifest.phase = ManifestPhase::ValidateOutputs;
        let checks = match contract_validator::validate_outputs(&contract, &run_dir.reports_dir()) {
            Ok(checks) => checks,
            Err((error_type, checks)) => {
                tl_fail(&timeline, &job_id, error_type.as_str(), &describe_checks(&checks));
                handle.stop().await;
                return self.fail(
                    run_dir,
                    job_id,
                    &mut manifest,
                    error_type,
                    &format!("Output validation failed: {}", error_type.as_str()),
                    None,
                    Some(&contract_path),
                );
            }
        };
        tl_state_exit(&timeline, &job_id, "VALIDATE_OUTPUTS");

        // SUMMARIZE
        tl_state_enter(&timeline, &job_id, "SUMMARIZE");
        manifest.phase = ManifestPhase::Summarize;
        let summary = Summary {
            job_id: job_id.clone(),
            status: "PASS".to_string(),
            error_type: None,
            design: manifest.design.clone(),
            skill: manifest.skill.clone(),
            metrics: serde_json::json!({ "total_outputs": checks.len() }),
            artifacts: checks.iter().flat_map(|c| c.matched_files.clone()).collect(),
        };
        write_summary(&run_dir, &summary);
        tl_state_exit(&timeline, &job_id, "SUMMARIZE");

        // DONE
        tl_done(&timeline, &job_id);
        manifest.phase = ManifestPhase::Done;
        manifest.status = JobStatus::Pass;
        manifest.error_type = None;
        manifest.updated_at = now_millis_string();
        let _ = write_manifest(&run_dir, &manifest);

        handle.stop().await;

        JobResult {
            job_id,
            run_dir: run_dir.root().to_path_buf(),
            outcome: JobOutcome::Pass,
        }
    }

    fn create_run_dir(&self) -> std::io::Result<RunDir> {
        std::fs::create_dir_all(&self.runs_root)?;
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let id = self.id_gen.next();
        let rand = id.get(..8).unwrap_or(&id);
        let job_id = format!("{timestamp}_{rand}");
        let root = self.runs_root.join(job_id);
        std::fs::create_dir_all(&root)?;
        let run_dir = RunDir::new(root);
        run_dir
            .create_skeleton()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(run_dir)
    }

    async fn start_session(
        &self,
        run_dir: &RunDir,
        launch: &SessionLaunch,
    ) -> Result<Box<dyn SessionHandle>, String> {
        let handle = self
            .supervisor
            .start(run_dir, launch)
            .await
            .map_err(|e| e.to_string())?;

        let deadline = tokio::time::Instant::now() + self.config.session_ready_timeout;
        loop {
            if run_dir.ready_file().exists() {
                return Ok(handle);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err("Session ready timeout".to_string());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Submits one request to `queue/` and polls `result/` until the
    /// matching result appears or `ack_timeout` elapses.
    async fn submit_and_await(
        &self,
        run_dir: &RunDir,
        job_id: &str,
        seq: u64,
        payload: &str,
    ) -> Result<loom_core::protocol::SessionResult, AwaitError> {
        let request_id = self.id_gen.next();
        let request = Request {
            schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
            request_id: request_id.clone(),
            job_id: job_id.to_string(),
            seq,
            kind: "tcl".to_string(),
            payload: payload.to_string(),
            timeout_s: Some(self.config.ack_timeout.as_secs()),
            cancel_policy: CancelPolicy::CtrlC,
            marker: Marker {
                prefix: "LOOM_DONE".to_string(),
                token: request_id.clone(),
                mode: MarkerMode::RunnerInject,
            },
            created_at: now_millis_string(),
        };

        let bytes = request.to_json().map_err(|_| AwaitError::Timeout)?;
        let queue_path = run_dir.queue_dir().join(request.file_name());
        if control_plane::write_atomic(&queue_path, &bytes).is_err() {
            return Err(AwaitError::Timeout);
        }

        let result_path = run_dir.result_dir().join(format!("{request_id}.json"));
        let deadline = tokio::time::Instant::now() + self.config.ack_timeout;
        loop {
            if let Ok(Some(bytes)) = control_plane::read_bytes(&result_path) {
                if let Ok(result) = loom_core::protocol::SessionResult::from_json(&bytes) {
                    return Ok(result);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AwaitError::Timeout);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fail(
        &self,
        run_dir: RunDir,
        job_id: String,
        manifest: &mut Manifest,
        error_type: ErrorType,
        summary: &str,
        last_fail_result_path: Option<&Path>,
        contract_path: Option<&Path>,
    ) -> JobResult {
        manifest.phase = ManifestPhase::Fail;
        manifest.status = JobStatus::Fail;
        manifest.error_type = Some(error_type);
        manifest.updated_at = now_millis_string();
        let _ = write_manifest(&run_dir, manifest);

        DebugBundleBuilder::new(&run_dir).build(
            &job_id,
            error_type,
            summary,
            last_fail_result_path,
            contract_path,
        );

        JobResult {
            job_id,
            run_dir: run_dir.root().to_path_buf(),
            outcome: JobOutcome::Fail(error_type),
        }
    }
}

fn write_manifest(run_dir: &RunDir, manifest: &Manifest) -> Result<(), ()> {
    match manifest.to_json() {
        Ok(bytes) => control_plane::write_atomic(&run_dir.job_manifest_file(), &bytes).map_err(|_| ()),
        Err(_) => Err(()),
    }
}

fn write_summary(run_dir: &RunDir, summary: &Summary) {
    if let Ok(bytes) = summary.to_json() {
        let _ = control_plane::write_atomic(&run_dir.summary_json_file(), &bytes);
    }
    let _ = control_plane::write_atomic(&run_dir.summary_md_file(), summary.to_markdown().as_bytes());
}

fn load_contract(path: &Path) -> Result<Contract, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Contract::from_yaml(&raw).map_err(|e| e.to_string())
}

fn describe_checks(checks: &[OutputCheck]) -> String {
    checks
        .iter()
        .map(|c| format!("{}:{:?}", c.path_glob, c.status))
        .collect::<Vec<_>>()
        .join(", ")
}

fn tl_state_enter(timeline: &TimelineWriter, job_id: &str, state: &str) {
    info!(state, "state enter");
    let _ = timeline.append(&TimelineEntry {
        ts: now_millis_string(),
        job_id: job_id.to_string(),
        level: TimelineLevel::Info,
        event: TimelineEvent::StateEnter,
        state: Some(state.to_string()),
        data: None,
    });
}

fn tl_state_exit(timeline: &TimelineWriter, job_id: &str, state: &str) {
    info!(state, "state exit");
    let _ = timeline.append(&TimelineEntry {
        ts: now_millis_string(),
        job_id: job_id.to_string(),
        level: TimelineLevel::Info,
        event: TimelineEvent::StateExit,
        state: Some(state.to_string()),
        data: None,
    });
}

fn tl_action(timeline: &TimelineWriter, job_id: &str, action: &str, detail: &str) {
    info!(action, detail, "action");
    let _ = timeline.append(&TimelineEntry {
        ts: now_millis_string(),
        job_id: job_id.to_string(),
        level: TimelineLevel::Info,
        event: TimelineEvent::Action,
        state: None,
        data: Some(serde_json::json!({ "action": action, "detail": detail })),
    });
}

fn tl_fail(timeline: &TimelineWriter, job_id: &str, error_type: &str, message: &str) {
    warn!(error_type, message, "job failed");
    let _ = timeline.append(&TimelineEntry {
        ts: now_millis_string(),
        job_id: job_id.to_string(),
        level: TimelineLevel::Error,
        event: TimelineEvent::Fail,
        state: None,
        data: Some(serde_json::json!({ "error_type": error_type, "message": message })),
    });
}

fn tl_done(timeline: &TimelineWriter, job_id: &str) {
    info!("job done");
    let _ = timeline.append(&TimelineEntry {
        ts: now_millis_string(),
        job_id: job_id.to_string(),
        level: TimelineLevel::Info,
        event: TimelineEvent::Done,
        state: None,
        data: None,
    });
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
