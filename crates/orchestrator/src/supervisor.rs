// SPDX-License-Identifier: MIT

//! START_SESSION: launches the Session Runner for one run-dir and polls
//! for `session/ready`, per spec.md §4.4.
//!
//! The orchestrator and the runner are independent processes that
//! communicate only through the filesystem (spec.md §5), so production
//! launches `loom-runner` as a child process. Tests substitute an
//! in-process supervisor that drives a real [`loom_engine::SessionRunner`]
//! against a [`loom_adapters::FakeToolAdapter`], exercising the full
//! queue/result protocol without a PTY.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use loom_storage::RunDir;
use tokio::process::{Child, Command};

/// What the orchestrator needs to launch one session.
#[derive(Debug, Clone)]
pub struct SessionLaunch {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    pub boot_commands: Vec<String>,
    pub heartbeat_interval: Duration,
    pub enable_lease: bool,
}

/// A live session the orchestrator can stop once the job is done (or has
/// failed).
#[async_trait]
pub trait SessionHandle: Send + Sync {
    async fn stop(&mut self);
}

/// Launches and supervises Session Runner processes.
#[async_trait]
pub trait SessionSupervisor: Send + Sync {
    async fn start(
        &self,
        run_dir: &RunDir,
        launch: &SessionLaunch,
    ) -> std::io::Result<Box<dyn SessionHandle>>;
}

/// Production supervisor: spawns the `loom-runner` binary as a detached
/// child process.
pub struct ProcessSupervisor {
    /// Path to the `loom-runner` binary, or a bare name resolved via
    /// `PATH`.
    runner_bin: PathBuf,
}

impl ProcessSupervisor {
    pub fn new(runner_bin: impl Into<PathBuf>) -> Self {
        Self {
            runner_bin: runner_bin.into(),
        }
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new("loom-runner")
    }
}

#[async_trait]
impl SessionSupervisor for ProcessSupervisor {
    async fn start(
        &self,
        run_dir: &RunDir,
        launch: &SessionLaunch,
    ) -> std::io::Result<Box<dyn SessionHandle>> {
        let mut cmd = Command::new(&self.runner_bin);
        cmd.arg("--run-dir").arg(run_dir.root());
        cmd.arg("--cwd").arg(&launch.cwd);
        cmd.arg("--argv");
        for arg in &launch.argv {
            cmd.arg(arg);
        }
        for boot in &launch.boot_commands {
            cmd.arg("--boot-command").arg(boot);
        }
        cmd.arg("--heartbeat-interval-ms")
            .arg(launch.heartbeat_interval.as_millis().to_string());
        if !launch.enable_lease {
            cmd.arg("--no-lease");
        }
        cmd.kill_on_drop(true);

        let child = cmd.spawn()?;
        Ok(Box::new(ProcessHandle { child: Some(child) }))
    }
}

struct ProcessHandle {
    child: Option<Child>,
}

#[async_trait]
impl SessionHandle for ProcessHandle {
    async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::Arc;

    use loom_adapters::FakeToolAdapter;
    use loom_core::UuidIdGen;
    use loom_engine::{LoopSignal, RunnerConfig, SessionRunner};

    /// In-process supervisor: runs a real [`SessionRunner`] against a
    /// caller-supplied [`FakeToolAdapter`] on a background task, so
    /// orchestrator tests exercise the genuine queue/result protocol
    /// without a PTY or a second process.
    pub struct FakeSupervisor {
        adapter: Arc<FakeToolAdapter>,
    }

    impl FakeSupervisor {
        pub fn new(adapter: Arc<FakeToolAdapter>) -> Self {
            Self { adapter }
        }
    }

    #[async_trait]
    impl SessionSupervisor for FakeSupervisor {
        async fn start(
            &self,
            run_dir: &RunDir,
            launch: &SessionLaunch,
        ) -> std::io::Result<Box<dyn SessionHandle>> {
            let mut config = RunnerConfig::new(launch.argv.clone(), launch.cwd.clone())
                .with_boot_commands(launch.boot_commands.clone())
                .with_heartbeat_interval(launch.heartbeat_interval);
            config.poll_quantum = Duration::from_millis(10);
            if !launch.enable_lease {
                config = config.without_lease();
            }

            let runner = Arc::new(SessionRunner::new(
                run_dir.clone(),
                config,
                self.adapter.clone(),
                &UuidIdGen,
            ));
            runner
                .start()
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;

            let (stop_tx, mut stop_rx) = tokio::sync::mpsc::channel::<()>(1);
            let task_runner = runner.clone();
            let task = tokio::spawn(async move {
                loop {
                    if stop_rx.try_recv().is_ok() {
                        break;
                    }
                    match task_runner.poll_once().await {
                        Ok(LoopSignal::Continue) => {}
                        Ok(LoopSignal::Stop) => break,
                        Err(_) => {}
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            });

            Ok(Box::new(FakeHandle {
                stop_tx,
                task: Some(task),
            }))
        }
    }

    struct FakeHandle {
        stop_tx: tokio::sync::mpsc::Sender<()>,
        task: Option<tokio::task::JoinHandle<()>>,
    }

    #[async_trait]
    impl SessionHandle for FakeHandle {
        async fn stop(&mut self) {
            let _ = self.stop_tx.send(()).await;
            if let Some(task) = self.task.take() {
                let _ = tokio::time::timeout(Duration::from_secs(2), task).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
