// SPDX-License-Identifier: MIT

//! The Summary entity: the final, human- and machine-readable outcome of
//! one job, written as both `summary.json` and `summary.md`.

use serde::{Deserialize, Serialize};

use crate::error::ErrorType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default)]
    pub metrics: serde_json::Value,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Renders the human-readable companion to `summary.json`.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Job {}\n\n", self.job_id));
        md.push_str(&format!("- **status**: {}\n", self.status));
        if let Some(error_type) = self.error_type {
            md.push_str(&format!("- **error_type**: {}\n", error_type));
        }
        if let Some(design) = &self.design {
            md.push_str(&format!("- **design**: {}\n", design));
        }
        if let Some(skill) = &self.skill {
            md.push_str(&format!("- **skill**: {}\n", skill));
        }
        if !self.artifacts.is_empty() {
            md.push_str("\n## Artifacts\n\n");
            for artifact in &self.artifacts {
                md.push_str(&format!("- {}\n", artifact));
            }
        }
        md
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
