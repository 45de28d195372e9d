// SPDX-License-Identifier: MIT

//! Runner launch configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Everything the session runner needs to launch and supervise one tool
/// process against one run-dir.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    pub boot_commands: Vec<String>,
    pub heartbeat_interval: Duration,
    pub enable_lease: bool,
    pub poll_quantum: Duration,
}

impl RunnerConfig {
    pub fn new(argv: Vec<String>, cwd: PathBuf) -> Self {
        Self {
            argv,
            cwd,
            boot_commands: Vec::new(),
            heartbeat_interval: Duration::from_secs(5),
            enable_lease: true,
            poll_quantum: Duration::from_millis(100),
        }
    }

    pub fn with_boot_commands(mut self, boot_commands: Vec<String>) -> Self {
        self.boot_commands = boot_commands;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn without_lease(mut self) -> Self {
        self.enable_lease = false;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
