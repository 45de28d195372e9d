// SPDX-License-Identifier: MIT

//! The file-system wire protocol: every type that crosses a run-dir
//! boundary between the orchestrator and a session runner.

pub mod contract;
pub mod control;
pub mod lease;
pub mod manifest;
pub mod request;
pub mod result;
pub mod skill_step;
pub mod state;
pub mod summary;
pub mod timeline;

pub use contract::{Contract, RequiredOutput};
pub use control::{CancelScope, CancelSignal, StopMode, StopSignal};
pub use lease::Lease;
pub use manifest::Manifest;
pub use request::{CancelPolicy, Marker, MarkerMode, Request};
pub use result::{ResultStatus, SessionResult};
pub use skill_step::SkillStep;
pub use state::{RunnerPhase, State};
pub use summary::Summary;
pub use timeline::{TimelineEntry, TimelineEvent, TimelineLevel};

/// Schema version stamped on every wire-protocol JSON document.
pub const SCHEMA_VERSION: &str = "1.0";

/// Logs a mismatch without rejecting the document, matching the
/// prototype's tolerant `from_dict` behavior.
pub(crate) fn check_schema_version(seen: &str, type_name: &str) {
    if seen != SCHEMA_VERSION {
        tracing::warn!(
            seen_version = seen,
            expected_version = SCHEMA_VERSION,
            %type_name,
            "unexpected schema_version"
        );
    }
}
