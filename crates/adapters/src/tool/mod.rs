// SPDX-License-Identifier: MIT

//! The tool process adapter: owns the pseudo-terminal connection to one
//! interactive EDA tool process for the lifetime of a session.

mod noop;
mod pty;

pub use noop::NoopToolAdapter;
pub use pty::PtyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeToolAdapter, ToolCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn tool process: {0}")]
    Spawn(String),
    #[error("failed to write to tool: {0}")]
    Write(String),
    #[error("failed to read from tool: {0}")]
    Read(String),
    #[error("tool process is not alive")]
    NotAlive,
}

/// Owns one tool process's stdio over a PTY. Implementations must never
/// block the caller longer than necessary to perform exactly the
/// operation requested — the session runner is responsible for bounding
/// wait time with its own polling quantum.
#[async_trait]
pub trait ToolAdapter: Send + Sync + 'static {
    /// Spawns the tool with the given argv and working directory.
    async fn spawn(&self, argv: &[String], cwd: &std::path::Path) -> Result<(), ToolError>;

    /// Writes raw bytes to the tool's stdin.
    async fn write(&self, bytes: &[u8]) -> Result<(), ToolError>;

    /// Reads one chunk of available bytes from the tool's stdout, or
    /// `None` if none are available within the implementation's own
    /// short internal wait. Returns `Ok(Some(vec![]))` never; an empty
    /// read is reported as `None`.
    async fn read_chunk(&self) -> Result<Option<Vec<u8>>, ToolError>;

    /// Sends a single control byte (e.g. `0x03` for Ctrl-C) to the tool.
    async fn send_signal_byte(&self, byte: u8) -> Result<(), ToolError>;

    /// Gracefully terminates the tool's process group (SIGTERM on unix).
    async fn terminate(&self) -> Result<(), ToolError>;

    /// Forcefully kills the tool (SIGKILL on unix).
    async fn kill(&self) -> Result<(), ToolError>;

    /// Whether the tool process is still alive.
    async fn is_alive(&self) -> Result<bool, ToolError>;
}
