// SPDX-License-Identifier: MIT

//! `loom runner` - direct session management, independent of the
//! orchestrator. Cancel and stop only ever touch `ctl/`; start and tail
//! are the two verbs that need a live runner process or log file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use loom_core::protocol::{CancelScope, CancelSignal, StopMode, StopSignal};
use loom_storage::control_plane;
use loom_storage::RunDir;

#[derive(Args)]
pub struct RunnerArgs {
    #[command(subcommand)]
    pub command: RunnerCommand,
}

#[derive(Subcommand)]
pub enum RunnerCommand {
    /// Start a Session Runner against a run-dir, in the foreground
    Start(StartArgs),
    /// Tail a session's combined output log
    Tail(TailArgs),
    /// Write a cancel signal into a session's control plane
    Cancel(CancelArgs),
    /// Write a stop signal into a session's control plane
    Stop(StopArgs),
}

#[derive(Args)]
pub struct StartArgs {
    /// Run-dir this session owns
    #[arg(long)]
    session_dir: PathBuf,
    /// Tool command and arguments, e.g. `--argv innovus -nolog`
    #[arg(long, num_args = 1.., required = true)]
    argv: Vec<String>,
    /// File of newline-separated commands run once at startup
    #[arg(long)]
    boot: Option<PathBuf>,
    /// Heartbeat refresh interval, e.g. "5s"
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    heartbeat_interval: Duration,
    /// Disable lease-based liveness checking
    #[arg(long)]
    no_lease: bool,
}

#[derive(Args)]
pub struct TailArgs {
    /// Run-dir to tail
    #[arg(long)]
    session_dir: PathBuf,
    /// Keep following the log as it grows
    #[arg(long)]
    follow: bool,
}

#[derive(Args)]
pub struct CancelArgs {
    /// Run-dir to signal
    #[arg(long)]
    session_dir: PathBuf,
    /// Cancel one specific request by id
    #[arg(long)]
    request_id: Option<String>,
    /// Cancel whichever request is currently in flight
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
pub struct StopArgs {
    /// Run-dir to signal
    #[arg(long)]
    session_dir: PathBuf,
    /// Stop immediately rather than waiting for the in-flight request
    #[arg(long)]
    force: bool,
}

fn load_boot_commands(path: &Option<PathBuf>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read boot command file {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

pub async fn start(args: StartArgs) -> Result<()> {
    let run_dir = RunDir::new(&args.session_dir);
    run_dir.create_skeleton()?;
    let boot_commands = load_boot_commands(&args.boot)?;

    let mut cmd = tokio::process::Command::new("loom-runner");
    cmd.arg("--run-dir").arg(&args.session_dir);
    cmd.arg("--cwd").arg(&args.session_dir);
    cmd.arg("--argv");
    for arg in &args.argv {
        cmd.arg(arg);
    }
    for boot in &boot_commands {
        cmd.arg("--boot-command").arg(boot);
    }
    cmd.arg("--heartbeat-interval-ms")
        .arg(args.heartbeat_interval.as_millis().to_string());
    if args.no_lease {
        cmd.arg("--no-lease");
    }

    let mut child = cmd.spawn().context("failed to spawn loom-runner")?;

    let stop_file = run_dir.stop_file();
    ctrlc::set_handler(move || {
        let signal = StopSignal {
            mode: StopMode::Graceful,
        };
        if let Ok(bytes) = signal.to_json() {
            let _ = control_plane::write_atomic(&stop_file, &bytes);
        }
        eprintln!("stop requested, waiting for the runner to exit gracefully");
    })
    .context("failed to install Ctrl-C handler")?;

    let status = child.wait().await.context("failed to wait on loom-runner")?;
    if !status.success() {
        bail!("loom-runner exited with {status}");
    }
    Ok(())
}

pub async fn tail(args: TailArgs) -> Result<()> {
    let run_dir = RunDir::new(&args.session_dir);
    let log_path = run_dir.session_out_log();
    if !log_path.exists() {
        bail!("session log not found: {}", log_path.display());
    }

    if args.follow {
        let status = std::process::Command::new("tail")
            .arg("-f")
            .arg(&log_path)
            .status()
            .context("failed to spawn tail")?;
        if !status.success() {
            bail!("tail exited with {status}");
        }
    } else {
        let contents = std::fs::read_to_string(&log_path)
            .with_context(|| format!("failed to read {}", log_path.display()))?;
        print!("{contents}");
    }
    Ok(())
}

pub fn cancel(args: CancelArgs) -> Result<()> {
    if args.all && args.request_id.is_some() {
        bail!("--all and --request-id are mutually exclusive");
    }
    if !args.all && args.request_id.is_none() {
        bail!("one of --all or --request-id is required");
    }

    let run_dir = RunDir::new(&args.session_dir);
    let signal = if args.all {
        CancelSignal {
            scope: CancelScope::Current,
            request_id: None,
        }
    } else {
        CancelSignal {
            scope: CancelScope::ById,
            request_id: args.request_id,
        }
    };
    let bytes = signal.to_json()?;
    control_plane::write_atomic(&run_dir.cancel_file(), &bytes)?;
    println!("cancel request written");
    Ok(())
}

pub fn stop(args: StopArgs) -> Result<()> {
    let run_dir = RunDir::new(&args.session_dir);
    let signal = StopSignal {
        mode: if args.force {
            StopMode::Force
        } else {
            StopMode::Graceful
        },
    };
    let bytes = signal.to_json()?;
    control_plane::write_atomic(&run_dir.stop_file(), &bytes)?;
    println!(
        "stop request written (mode: {})",
        if args.force { "force" } else { "graceful" }
    );
    Ok(())
}
