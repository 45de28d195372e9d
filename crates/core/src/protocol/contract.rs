// SPDX-License-Identifier: MIT

//! The Contract entity: a declarative statement of the output artifacts a
//! skill must produce. Loaded from YAML, kept deliberately separate from
//! the JSON request/result protocol.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredOutput {
    #[serde(rename = "path-glob")]
    pub path_glob: String,
    #[serde(default)]
    pub non_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub required_outputs: Vec<RequiredOutput>,
    #[serde(default)]
    pub debug_hints: Vec<String>,
}

impl Contract {
    pub fn from_yaml(raw: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(raw)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
