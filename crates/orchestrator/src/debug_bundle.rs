// SPDX-License-Identifier: MIT

//! Debug Bundle Builder (C6): on every terminal FAIL, assembles a
//! minimal reproducible evidence snapshot under `debug_bundle/`, per
//! spec.md §4.6.
//!
//! The `error_type -> next_actions` table and bundle contents are
//! grounded in `original_source/skillpilot/protocol/debug_bundle.py`,
//! renamed from the Innovus-specific vocabulary to the spec's generic
//! `TOOL_CRASH` / `tool.std{out,err}.log`.

use std::io::{BufRead, Write};
use std::path::Path;

use loom_core::ErrorType;
use loom_storage::control_plane;
use loom_storage::RunDir;
use serde::Serialize;
use serde_json::json;

const TAIL_LINES: usize = 2000;
const KNOWN_LOGS: &[&str] = &["supervisor.log", "tool.stdout.log", "tool.stderr.log"];

#[derive(Debug, Serialize)]
struct ReportEntry {
    path: String,
    size: u64,
    mtime: String,
}

/// Builds `debug_bundle/` for one terminal failure. Never fails the job
/// further: a missing source is simply omitted from the index.
pub struct DebugBundleBuilder<'a> {
    run_dir: &'a RunDir,
}

impl<'a> DebugBundleBuilder<'a> {
    pub fn new(run_dir: &'a RunDir) -> Self {
        Self { run_dir }
    }

    /// Assembles the bundle. `last_fail_ack_path`, `reports_dir`, and
    /// `contract_path` are each optional because not every failing state
    /// has produced them yet (e.g. a `LOCATOR_FAIL` never reaches
    /// `reports/`).
    pub fn build(
        &self,
        job_id: &str,
        error_type: ErrorType,
        summary: &str,
        last_fail_result_path: Option<&Path>,
        contract_path: Option<&Path>,
    ) {
        let bundle_dir = self.run_dir.debug_bundle_dir();
        if let Err(e) = std::fs::create_dir_all(&bundle_dir) {
            tracing::warn!(error = %e, "failed to create debug_bundle dir");
            return;
        }

        let mut pointers = serde_json::Map::new();

        let manifest_path = self.run_dir.job_manifest_file();
        if manifest_path.exists() {
            copy_into(&manifest_path, &bundle_dir.join("job_manifest.json"));
            pointers.insert("manifest".to_string(), json!("job_manifest.json"));
        }

        let timeline_path = self.run_dir.job_timeline_file();
        if timeline_path.exists() {
            copy_into(&timeline_path, &bundle_dir.join("job_timeline.jsonl"));
            pointers.insert("timeline".to_string(), json!("job_timeline.jsonl"));
        }

        if let Some(ack_path) = last_fail_result_path {
            if ack_path.exists() {
                let ack_dir = bundle_dir.join("result");
                let _ = std::fs::create_dir_all(&ack_dir);
                if let Some(name) = ack_path.file_name() {
                    copy_into(ack_path, &ack_dir.join(name));
                    pointers.insert(
                        "last_fail_result".to_string(),
                        json!(format!("result/{}", name.to_string_lossy())),
                    );
                }
            }
        }

        let session_dir = self.run_dir.session_dir();
        if session_dir.exists() {
            let session_bundle_dir = bundle_dir.join("session");
            let _ = std::fs::create_dir_all(&session_bundle_dir);

            let state_file = self.run_dir.session_state_file();
            if state_file.exists() {
                copy_into(&state_file, &session_bundle_dir.join("state.json"));
            }

            for log_name in KNOWN_LOGS {
                let log_path = session_dir.join(log_name);
                if log_path.exists() {
                    let tail_path = session_bundle_dir.join(format!("{log_name}.tail"));
                    tail_file(&log_path, &tail_path, TAIL_LINES);
                }
            }
            pointers.insert("session_logs".to_string(), json!("session/"));
        }

        let reports_dir = self.run_dir.reports_dir();
        if reports_dir.exists() {
            let inventory_path = bundle_dir.join("reports_inventory.json");
            write_inventory(&reports_dir, &inventory_path);
            pointers.insert(
                "reports_inventory".to_string(),
                json!("reports_inventory.json"),
            );
        }

        if let Some(contract_path) = contract_path {
            if contract_path.exists() {
                copy_into(contract_path, &bundle_dir.join("contract.yaml"));
                pointers.insert("contract".to_string(), json!("contract.yaml"));
            }
        }

        let index = json!({
            "schema_version": loom_core::protocol::SCHEMA_VERSION,
            "job_id": job_id,
            "error_type": error_type.as_str(),
            "summary": summary,
            "generated_at": loom_core::time_fmt::now_millis_string(),
            "pointers": pointers,
            "next_actions": next_actions(error_type),
        });

        match serde_json::to_vec_pretty(&index) {
            Ok(bytes) => {
                if let Err(e) = control_plane::write_atomic(&bundle_dir.join("index.json"), &bytes)
                {
                    tracing::warn!(error = %e, "failed to write debug_bundle index");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize debug_bundle index"),
        }
    }
}

fn copy_into(src: &Path, dst: &Path) {
    if let Err(e) = std::fs::copy(src, dst) {
        tracing::warn!(src = %src.display(), error = %e, "failed to copy debug_bundle source");
    }
}

fn tail_file(src: &Path, dst: &Path, lines: usize) {
    let Ok(file) = std::fs::File::open(src) else {
        return;
    };
    let reader = std::io::BufReader::new(file);
    let mut buf: std::collections::VecDeque<String> = std::collections::VecDeque::with_capacity(lines);
    for line in reader.lines() {
        let Ok(line) = line else { continue };
        if buf.len() == lines {
            buf.pop_front();
        }
        buf.push_back(line);
    }
    let Ok(mut out) = std::fs::File::create(dst) else {
        return;
    };
    for line in buf {
        let _ = writeln!(out, "{line}");
    }
}

fn write_inventory(reports_dir: &Path, inventory_path: &Path) {
    let mut entries = Vec::new();
    walk_files(reports_dir, reports_dir, &mut entries);
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    if let Ok(bytes) = serde_json::to_vec_pretty(&entries) {
        let _ = control_plane::write_atomic(inventory_path, &bytes);
    }
}

fn walk_files(root: &Path, dir: &Path, out: &mut Vec<ReportEntry>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_files(root, &path, out);
            continue;
        }
        let Ok(metadata) = path.metadata() else {
            continue;
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| chrono::DateTime::<chrono::Utc>::from_timestamp(d.as_secs() as i64, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();
        out.push(ReportEntry {
            path: path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string(),
            size: metadata.len(),
            mtime,
        });
    }
}

/// Fixed remediation table, one entry per `error_type`, per spec.md §4.6.
fn next_actions(error_type: ErrorType) -> Vec<&'static str> {
    match error_type {
        ErrorType::LocatorFail => vec![
            "Check if the design and its data file exist and are readable",
            "Try an explicit path: ./path/to/design.enc",
            "Check permissions and mount points",
        ],
        ErrorType::SessionStartFail => vec![
            "Check session/supervisor.log for launch errors",
            "Verify the tool's installation and license",
            "Check queue availability and resources",
        ],
        ErrorType::ToolCrash => vec![
            "Check session/state.json for the runner's last known phase",
            "Review the tool stdout/stderr tail",
            "Check if the design database is corrupted",
        ],
        ErrorType::HeartbeatLost => vec![
            "Check state/heartbeat's last update time",
            "Verify the tool process is still running",
            "Check system resources and queue status",
        ],
        ErrorType::QueueTimeout => vec![
            "Check if the heartbeat is still updating",
            "Review script execution logs",
            "Check for infinite loops or long operations",
        ],
        ErrorType::RestoreFail => vec![
            "Review the result message and tool log tail",
            "Check if the design contains relative path dependencies",
            "Verify the design data file is compatible",
        ],
        ErrorType::CmdFail => vec![
            "Check the result message for a script error",
            "Review the script under scripts/",
            "Check for syntax errors in the generated script",
        ],
        ErrorType::ContractInvalid => vec![
            "Review contract.yaml",
            "Ensure required outputs are specified",
            "Check path constraints (must start with reports/, no absolute or .. paths)",
        ],
        ErrorType::OutputMissing => vec![
            "Check reports_inventory.json",
            "Verify the script generated the required outputs",
            "Check contract.yaml's required-output globs",
        ],
        ErrorType::OutputEmpty => vec![
            "Check report file sizes in reports/",
            "Verify the script produced non-empty outputs",
            "Review the script logic",
        ],
        ErrorType::Ok => vec!["Review debug_bundle contents for details"],
    }
}

#[cfg(test)]
#[path = "debug_bundle_tests.rs"]
mod tests;
