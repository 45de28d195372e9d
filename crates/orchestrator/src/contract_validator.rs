// SPDX-License-Identifier: MIT

//! Contract Validator (C5): static contract validation plus runtime
//! artifact matching against a reports directory, per spec.md §4.5.
//!
//! Grounded in `original_source/skillpilot/contracts/__init__.py` and
//! `protocol/contract.py::Contract.validate`.

use std::path::Path;

use loom_core::protocol::Contract;
use loom_core::ErrorType;

/// One required-output's outcome against the reports directory.
#[derive(Debug, Clone)]
pub struct OutputCheck {
    pub path_glob: String,
    pub matched_files: Vec<String>,
    pub status: OutputStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Ok,
    Missing,
    Empty,
}

/// Static validation: is this contract even well-formed, independent of
/// any run-dir. Checked before the session is ever started.
pub fn validate_static(contract: &Contract) -> Result<(), String> {
    if contract.required_outputs.is_empty() {
        return Err("no required outputs specified".to_string());
    }
    for output in &contract.required_outputs {
        let path = &output.path_glob;
        if !path.starts_with("reports/") {
            return Err(format!("output path must start with 'reports/': {path}"));
        }
        if path.contains("..") {
            return Err(format!("output path must not contain '..': {path}"));
        }
        if path.starts_with('/') || is_windows_drive_absolute(path) {
            return Err(format!("output path must be relative: {path}"));
        }
    }
    if contract.debug_hints.len() < 2 {
        return Err("at least 2 debug hints required".to_string());
    }
    Ok(())
}

fn is_windows_drive_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() > 1 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Runtime validation: match each required output's glob against
/// `reports_dir`. Returns `Ok(checks)` only when every required output
/// resolved to at least one match, and every matched file that declares
/// `non_empty` is non-zero-size. Missing dominates empty in declaration
/// order, matching the prototype's first-failure-wins semantics.
pub fn validate_outputs(
    contract: &Contract,
    reports_dir: &Path,
) -> Result<Vec<OutputCheck>, (ErrorType, Vec<OutputCheck>)> {
    let mut checks = Vec::with_capacity(contract.required_outputs.len());

    for required in &contract.required_outputs {
        let relative = required
            .path_glob
            .strip_prefix("reports/")
            .unwrap_or(&required.path_glob);
        let pattern = reports_dir.join(relative);
        let pattern_str = pattern.to_string_lossy().into_owned();

        let matched: Vec<String> = glob::glob(&pattern_str)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .map(|p| p.display().to_string())
            .collect();

        if matched.is_empty() {
            checks.push(OutputCheck {
                path_glob: required.path_glob.clone(),
                matched_files: Vec::new(),
                status: OutputStatus::Missing,
            });
            continue;
        }

        let status = if required.non_empty && matched.iter().any(|p| is_empty(Path::new(p))) {
            OutputStatus::Empty
        } else {
            OutputStatus::Ok
        };
        checks.push(OutputCheck {
            path_glob: required.path_glob.clone(),
            matched_files: matched,
            status,
        });
    }

    if checks.iter().any(|c| c.status == OutputStatus::Missing) {
        return Err((ErrorType::OutputMissing, checks));
    }
    if checks.iter().any(|c| c.status == OutputStatus::Empty) {
        return Err((ErrorType::OutputEmpty, checks));
    }
    Ok(checks)
}

fn is_empty(path: &Path) -> bool {
    path.metadata().map(|m| m.len() == 0).unwrap_or(true)
}

#[cfg(test)]
#[path = "contract_validator_tests.rs"]
mod tests;
