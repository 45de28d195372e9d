// SPDX-License-Identifier: MIT

//! The Timeline entity: an append-only JSONL event log for one job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineEvent {
    StateEnter,
    StateExit,
    Action,
    Done,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub ts: String,
    pub job_id: String,
    pub level: TimelineLevel,
    pub event: TimelineEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TimelineEntry {
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Parses a full `job_timeline.jsonl` file into its entries, in append
/// order. Blank trailing lines (a common artifact of line-buffered
/// appends) are skipped.
pub fn parse_timeline(raw: &str) -> serde_json::Result<Vec<TimelineEntry>> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(TimelineEntry::from_json_line)
        .collect()
}

#[cfg(test)]
#[path = "timeline_tests.rs"]
mod tests;
