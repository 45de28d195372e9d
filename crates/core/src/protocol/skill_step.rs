// SPDX-License-Identifier: MIT

//! The reduced form of one step of a skill/playbook: what the Markdown
//! authoring surface (out of scope here) compiles down to, and what the
//! orchestrator's `RUN_SKILL` state actually consumes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillStep {
    pub action: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
}

impl SkillStep {
    /// Formats this step as a `poke::<action> -<arg> <value> ...` payload
    /// line, the wire form the session runner's tool expects.
    pub fn to_poke_payload(&self) -> String {
        let mut out = format!("poke::{}", self.action);
        let mut iter = self.args.iter();
        while let Some(flag) = iter.next() {
            out.push_str(" -");
            out.push_str(flag);
            if let Some(value) = iter.next() {
                out.push(' ');
                out.push_str(value);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "skill_step_tests.rs"]
mod tests;
