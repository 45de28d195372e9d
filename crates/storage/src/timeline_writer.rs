// SPDX-License-Identifier: MIT

//! A thin, crash-safe appender for `job_timeline.jsonl`.

use std::path::{Path, PathBuf};

use loom_core::protocol::TimelineEntry;

use crate::control_plane::{self, ControlPlaneError};

#[derive(Debug, Clone)]
pub struct TimelineWriter {
    path: PathBuf,
}

impl TimelineWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single JSON line. Never rewrites a prior
    /// line: the timeline is strictly append-only.
    pub fn append(&self, entry: &TimelineEntry) -> Result<(), ControlPlaneError> {
        let line = entry.to_json_line().map_err(|e| ControlPlaneError::Io {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        control_plane::append_line(&self.path, &line)
    }

    pub fn read_all(&self) -> Result<Vec<TimelineEntry>, ControlPlaneError> {
        let raw = control_plane::read_bytes(&self.path)?.unwrap_or_default();
        let raw = String::from_utf8_lossy(&raw);
        loom_core::protocol::timeline::parse_timeline(&raw).map_err(|e| ControlPlaneError::Io {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

#[cfg(test)]
#[path = "timeline_writer_tests.rs"]
mod tests;
