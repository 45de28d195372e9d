// SPDX-License-Identifier: MIT

//! `loom orchestrate` - a thin wrapper over
//! [`loom_orchestrator::Orchestrator::run_job`]: the only way this CLI
//! actually drives a job to completion, rather than just poking at one
//! session's control plane.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use loom_core::LoomConfig;
use loom_orchestrator::{find_design_data, JobOutcome, Orchestrator, OrchestratorConfig, ProcessSupervisor, UserSelection};

use crate::error::LoomError;

#[derive(Args)]
pub struct OrchestrateArgs {
    /// Working directory the job runs in; also where `loom.toml` is read from
    #[arg(long)]
    cwd: PathBuf,
    /// Root directory of skill definitions (one subdirectory per skill)
    #[arg(long)]
    skill_root: PathBuf,
    /// Design name or explicit path to locate
    #[arg(long)]
    design: String,
    /// Skill to run once the design is restored
    #[arg(long)]
    skill: String,
    /// Resolve an ambiguous design query by naming the candidate to use
    #[arg(long)]
    select: Option<PathBuf>,
}

pub async fn handle(args: OrchestrateArgs) -> Result<()> {
    let loom_config = LoomConfig::load(&args.cwd.join("loom.toml"))?;

    let mut config = OrchestratorConfig::new(&args.skill_root);
    if let Some(timeout) = loom_config.session_ready_timeout {
        config = config.with_session_ready_timeout(timeout);
    }
    if let Some(timeout) = loom_config.ack_timeout {
        config = config.with_ack_timeout(timeout);
    }

    let orchestrator = Orchestrator::new(&args.cwd, config, Arc::new(ProcessSupervisor::default()));

    let result = match args.select {
        Some(design_path) => {
            let design_data_path = find_design_data(&design_path).ok_or_else(|| {
                LoomError::new(format!(
                    "no design data file found alongside {}",
                    design_path.display()
                ))
                .with_suggestion("expected <path>.dat or <stem>.enc.dat next to it")
            })?;
            orchestrator
                .resume_with_selection(
                    &args.design,
                    &args.skill,
                    UserSelection {
                        design_path,
                        design_data_path,
                    },
                )
                .await
        }
        None => orchestrator.run_job(&args.design, &args.skill).await,
    };

    match result.outcome {
        JobOutcome::Pass => {
            println!("job {} passed", result.job_id);
            println!("run dir: {}", result.run_dir.display());
            Ok(())
        }
        JobOutcome::Fail(error_type) => {
            Err(LoomError::job_failed(&result.run_dir, error_type).into())
        }
        JobOutcome::NeedsSelection(candidates) => {
            bail!(LoomError::needs_selection(&candidates))
        }
    }
}
