// SPDX-License-Identifier: MIT

//! Fake tool adapter for testing the session runner without a real PTY
//! or child process.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ToolAdapter, ToolError};

/// Recorded tool call, for assertions in runner tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Spawn { argv: Vec<String>, cwd: PathBuf },
    Write { bytes: Vec<u8> },
    SignalByte { byte: u8 },
    Terminate,
    Kill,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<ToolCall>,
    /// Chunks waiting to be returned from `read_chunk`, in order.
    pending_output: VecDeque<Vec<u8>>,
    alive: bool,
    written: Vec<u8>,
}

/// A scriptable tool process: tests enqueue output chunks with
/// [`FakeToolAdapter::push_output`] and assert on [`FakeToolAdapter::calls`].
#[derive(Clone, Default)]
pub struct FakeToolAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeToolAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one chunk of tool output to be returned by a future
    /// `read_chunk` call.
    pub fn push_output(&self, chunk: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending_output.push_back(chunk.into());
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }

    pub fn written_bytes(&self) -> Vec<u8> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).written.clone()
    }

    pub fn set_alive(&self, alive: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).alive = alive;
    }
}

#[async_trait]
impl ToolAdapter for FakeToolAdapter {
    async fn spawn(&self, argv: &[String], cwd: &Path) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.alive = true;
        state.calls.push(ToolCall::Spawn {
            argv: argv.to_vec(),
            cwd: cwd.to_path_buf(),
        });
        Ok(())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.written.extend_from_slice(bytes);
        state.calls.push(ToolCall::Write {
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    async fn read_chunk(&self) -> Result<Option<Vec<u8>>, ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.pending_output.pop_front())
    }

    async fn send_signal_byte(&self, byte: u8) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ToolCall::SignalByte { byte });
        Ok(())
    }

    async fn terminate(&self) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ToolCall::Terminate);
        state.alive = false;
        Ok(())
    }

    async fn kill(&self) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ToolCall::Kill);
        state.alive = false;
        Ok(())
    }

    async fn is_alive(&self) -> Result<bool, ToolError> {
        Ok(self.state.lock().unwrap_or_else(|e| e.into_inner()).alive)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
