// SPDX-License-Identifier: MIT

//! Optional `loom.toml` configuration, layered under explicit CLI flags.
//!
//! Precedence is CLI flag > config file > built-in default, the same
//! pattern the rest of this workspace uses for environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoomConfig {
    #[serde(default, with = "humantime_serde::option")]
    pub heartbeat_interval: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub poll_quantum: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub ack_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub session_ready_timeout: Option<Duration>,
}

impl LoomConfig {
    /// Loads config from `path` if it exists; returns the all-`None`
    /// default when it does not, so callers always fall back to built-in
    /// defaults without special-casing a missing file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
