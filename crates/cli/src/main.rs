// SPDX-License-Identifier: MIT

//! loom - the driver CLI: direct session management (`runner`) plus a
//! thin wrapper over the orchestrator (`orchestrate`).

mod commands;
mod error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{orchestrate, runner};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loom", version, about = "Disk-as-API session driver for interactive EDA tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Direct session management
    Runner(runner::RunnerArgs),
    /// Run a job end to end via the orchestrator
    Orchestrate(orchestrate::OrchestrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Runner(args) => match args.command {
            runner::RunnerCommand::Start(args) => runner::start(args).await,
            runner::RunnerCommand::Tail(args) => runner::tail(args).await,
            runner::RunnerCommand::Cancel(args) => runner::cancel(args),
            runner::RunnerCommand::Stop(args) => runner::stop(args),
        },
        Commands::Orchestrate(args) => orchestrate::handle(args).await,
    }
}
