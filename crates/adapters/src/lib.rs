// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the tool process: the one piece of I/O the session
//! runner cannot express in pure terms.

pub mod tool;

pub use tool::{NoopToolAdapter, PtyAdapter, ToolAdapter, ToolError};

#[cfg(any(test, feature = "test-support"))]
pub use tool::{FakeToolAdapter, ToolCall};
