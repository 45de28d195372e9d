// SPDX-License-Identifier: MIT

//! LOCATE_DB: resolves a user query (a design name or explicit path) to a
//! `(design, design_data)` pair, per spec.md §4.4.
//!
//! Grounded in `original_source/skillpilot/locator`: explicit-path
//! detection, a depth-bounded cwd scan, and the same candidate /
//! selection-reason vocabulary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One candidate design DB surfaced during a cwd scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub path: String,
    pub mtime: String,
    pub size: u64,
}

/// Outcome of one locate attempt.
#[derive(Debug, Clone)]
pub enum LocateOutcome {
    /// A unique design DB was found or selected.
    Found {
        design_path: PathBuf,
        design_data_path: PathBuf,
        selection_reason: &'static str,
    },
    /// More than one candidate matched; the caller must select one and
    /// re-invoke via [`crate::Orchestrator::resume_with_selection`].
    NeedsSelection { candidates: Vec<Candidate> },
    /// No candidate matched, or an explicit path did not resolve.
    Fail { reason: &'static str },
}

/// Design DB locator: explicit-path resolution or a depth-bounded scan.
pub struct Locator {
    cwd: PathBuf,
    scan_depth: usize,
}

impl Locator {
    pub fn new(cwd: impl Into<PathBuf>, scan_depth: usize) -> Self {
        Self {
            cwd: cwd.into(),
            scan_depth,
        }
    }

    pub fn locate(&self, query: &str) -> LocateOutcome {
        if is_explicit_path(query) {
            self.locate_explicit(query)
        } else {
            self.locate_scan(query)
        }
    }

    fn locate_explicit(&self, query: &str) -> LocateOutcome {
        let query_path = Path::new(query);
        let design_path = if query_path.is_absolute() {
            query_path.to_path_buf()
        } else {
            self.cwd.join(query_path)
        };

        if !design_path.exists() {
            return LocateOutcome::Fail {
                reason: "explicit_path_not_found",
            };
        }

        match find_design_data(&design_path) {
            Some(design_data_path) => LocateOutcome::Found {
                design_path,
                design_data_path,
                selection_reason: "direct_match",
            },
            None => LocateOutcome::Fail {
                reason: "design_data_missing",
            },
        }
    }

    fn locate_scan(&self, query: &str) -> LocateOutcome {
        let mut candidates = Vec::new();
        walk(&self.cwd, &self.cwd, self.scan_depth, query, &mut candidates);
        candidates.sort_by(|a, b| a.path.cmp(&b.path));

        match candidates.len() {
            0 => LocateOutcome::Fail {
                reason: "no_candidates",
            },
            1 => {
                let design_path = PathBuf::from(&candidates[0].path);
                match find_design_data(&design_path) {
                    Some(design_data_path) => LocateOutcome::Found {
                        design_path,
                        design_data_path,
                        selection_reason: "unique_scan_result",
                    },
                    None => LocateOutcome::Fail {
                        reason: "design_data_missing",
                    },
                }
            }
            _ => LocateOutcome::NeedsSelection { candidates },
        }
    }
}

/// A query counts as an explicit path if it looks like one syntactically,
/// matching the prototype's `_is_explicit_path` rather than checking
/// existence first.
fn is_explicit_path(query: &str) -> bool {
    query.contains('/')
        || query.contains('\\')
        || query.ends_with(".enc")
        || query.starts_with("./")
        || query.starts_with(".\\")
}

/// Finds the sibling data file for a design path, trying both naming
/// conventions the prototype accepts: `<path>.dat` and
/// `<stem>.enc.dat` alongside it.
///
/// Exposed so a driver can resolve `--select <path>` the same way a
/// scan-discovered candidate is resolved.
pub fn find_design_data(design_path: &Path) -> Option<PathBuf> {
    let direct = append_ext(design_path, "dat");
    if direct.exists() {
        return Some(direct);
    }
    let stem = design_path.file_stem()?.to_str()?;
    let alt = design_path.with_file_name(format!("{stem}.enc.dat"));
    if alt.exists() {
        return Some(alt);
    }
    None
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn walk(root: &Path, dir: &Path, remaining_depth: usize, query: &str, out: &mut Vec<Candidate>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if remaining_depth > 0 {
                walk(root, &path, remaining_depth - 1, query, out);
            }
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("enc") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if query.is_empty() || stem == query {
            if find_design_data(&path).is_none() {
                continue;
            }
            let Ok(metadata) = path.metadata() else {
                continue;
            };
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| chrono::DateTime::<chrono::Utc>::from_timestamp(d.as_secs() as i64, 0))
                .flatten()
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default();
            out.push(Candidate {
                path: path.display().to_string(),
                mtime,
                size: metadata.len(),
            });
        }
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
