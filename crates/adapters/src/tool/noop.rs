// SPDX-License-Identifier: MIT

//! No-op tool adapter: accepts every call, produces no bytes. Useful for
//! exercising the runner's control-plane logic without a real process.

use std::path::Path;

use async_trait::async_trait;

use super::{ToolAdapter, ToolError};

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopToolAdapter;

impl NoopToolAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolAdapter for NoopToolAdapter {
    async fn spawn(&self, _argv: &[String], _cwd: &Path) -> Result<(), ToolError> {
        Ok(())
    }

    async fn write(&self, _bytes: &[u8]) -> Result<(), ToolError> {
        Ok(())
    }

    async fn read_chunk(&self) -> Result<Option<Vec<u8>>, ToolError> {
        Ok(None)
    }

    async fn send_signal_byte(&self, _byte: u8) -> Result<(), ToolError> {
        Ok(())
    }

    async fn terminate(&self) -> Result<(), ToolError> {
        Ok(())
    }

    async fn kill(&self) -> Result<(), ToolError> {
        Ok(())
    }

    async fn is_alive(&self) -> Result<bool, ToolError> {
        Ok(true)
    }
}
