// SPDX-License-Identifier: MIT

//! loom-runner: the Session Runner binary (C1). Launched by an
//! orchestrator or directly by an operator, owns one tool process's PTY
//! for the lifetime of a session and drains its run-dir's `queue/`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use loom_adapters::PtyAdapter;
use loom_core::UuidIdGen;
use loom_engine::{LoopSignal, RunnerConfig, SessionRunner};
use loom_storage::RunDir;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "loom-runner", about = "Session runner for a loom run-dir")]
struct Args {
    /// Root of the run-dir this runner owns.
    #[arg(long)]
    run_dir: PathBuf,

    /// Tool command and arguments, e.g. `--argv innovus -nolog`.
    #[arg(long, num_args = 1.., required = true)]
    argv: Vec<String>,

    /// Working directory for the tool process.
    #[arg(long)]
    cwd: PathBuf,

    /// Tcl/shell commands run once at startup, before readiness.
    #[arg(long)]
    boot_command: Vec<String>,

    /// Heartbeat refresh interval, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    heartbeat_interval_ms: u64,

    /// Poll quantum for the IDLE/BUSY loop, in milliseconds.
    #[arg(long, default_value_t = 100)]
    poll_quantum_ms: u64,

    /// Disable lease-based liveness checking.
    #[arg(long)]
    no_lease: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let run_dir = RunDir::new(args.run_dir.as_path());

    let _log_guard = setup_logging(&run_dir)?;
    info!(run_dir = %args.run_dir.display(), "starting loom-runner");

    let mut config = RunnerConfig::new(args.argv, args.cwd)
        .with_boot_commands(args.boot_command)
        .with_heartbeat_interval(Duration::from_millis(args.heartbeat_interval_ms));
    config.poll_quantum = Duration::from_millis(args.poll_quantum_ms);
    if args.no_lease {
        config = config.without_lease();
    }

    let adapter = Arc::new(PtyAdapter::new());
    let runner = SessionRunner::new(run_dir, config, adapter, &UuidIdGen);

    runner.start().await?;

    loop {
        match runner.poll_once().await {
            Ok(LoopSignal::Continue) => {}
            Ok(LoopSignal::Stop) => {
                info!("runner loop stopping");
                break;
            }
            Err(e) => {
                error!(error = %e, "error in runner poll loop");
            }
        }
    }

    Ok(())
}

fn setup_logging(
    run_dir: &RunDir,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = run_dir.supervisor_log();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let log_dir = log_path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "supervisor log path has no parent directory",
        )
    })?;
    let log_file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "supervisor log path has no file name",
        )
    })?;
    let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
