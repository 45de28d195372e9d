// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! loom-orchestrator: the per-job state machine (C4), its contract
//! validator (C5), and its debug bundle builder (C6).

pub mod config;
pub mod contract_validator;
pub mod debug_bundle;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod supervisor;

pub use config::OrchestratorConfig;
pub use contract_validator::{OutputCheck, OutputStatus};
pub use debug_bundle::DebugBundleBuilder;
pub use error::OrchestratorError;
pub use locator::{find_design_data, Candidate, LocateOutcome, Locator};
pub use orchestrator::{JobOutcome, JobResult, Orchestrator, UserSelection};
pub use supervisor::{ProcessSupervisor, SessionHandle, SessionLaunch, SessionSupervisor};
