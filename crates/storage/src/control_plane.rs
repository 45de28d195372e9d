// SPDX-License-Identifier: MIT

//! Atomic filesystem primitives shared by every writer and reader that
//! touches a run-dir: the disk-as-API control plane itself.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn wrap(path: &Path, source: std::io::Error) -> ControlPlaneError {
    ControlPlaneError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `bytes` to `path` via a `path.tmp.<pid>.<random>` sibling +
/// fsync + rename, the only way any file may appear under a run-dir:
/// either complete or absent, never partial. Creates parent directories
/// on demand. The random suffix (on top of the pid) tolerates a second
/// writer racing a crashed process whose pid has already been reused.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ControlPlaneError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| wrap(parent, e))?;
    }
    let pid = std::process::id();
    let nonce: u32 = {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        seed ^ pid
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed");
    let tmp_name = format!("{file_name}.tmp.{pid}.{nonce}");
    let tmp_path = match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    };

    let mut file = File::create(&tmp_path).map_err(|e| wrap(&tmp_path, e))?;
    file.write_all(bytes).map_err(|e| wrap(&tmp_path, e))?;
    file.sync_all().map_err(|e| wrap(&tmp_path, e))?;
    drop(file);
    fs::rename(&tmp_path, path).map_err(|e| wrap(path, e))?;
    Ok(())
}

/// Reads and parses a JSON document at `path`; an absent file is success
/// with `None`, matching `read_json(path) -> object | ∅`.
pub fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, ControlPlaneError> {
    let raw = match read_bytes(path)? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let value = serde_json::from_slice(&raw)
        .map_err(|e| wrap(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    Ok(Some(value))
}

/// Reads raw bytes at `path`; an absent file is success with `None`.
pub fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, ControlPlaneError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(wrap(path, e)),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|e| wrap(path, e))?;
    Ok(Some(buf))
}

/// Deterministic enumeration of `dir` entries matching `prefix`/`suffix`,
/// sorted by name, for reproducible queue scans.
pub fn list_sorted(
    dir: &Path,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<String>, ControlPlaneError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(wrap(dir, e)),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| wrap(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(suffix) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Appends one line (with a trailing newline) to `path` via `O_APPEND`;
/// used only for the timeline and `session.out`, the two append-only
/// aggregates in the run-dir.
pub fn append_line(path: &Path, line: &str) -> Result<(), ControlPlaneError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| wrap(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| wrap(path, e))?;
    file.write_all(line.as_bytes()).map_err(|e| wrap(path, e))?;
    file.write_all(b"\n").map_err(|e| wrap(path, e))?;
    Ok(())
}

/// Atomically renames `src` to `dst`, both within the same directory;
/// the primitive behind every queue → inflight → result transition.
pub fn rename(src: &Path, dst: &Path) -> Result<(), ControlPlaneError> {
    fs::rename(src, dst).map_err(|e| wrap(src, e))
}

/// Removes a file if present; absence is not an error. Used to consume
/// one-shot control signals after the runner handles them.
pub fn remove_if_exists(path: &Path) -> Result<(), ControlPlaneError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(wrap(path, e)),
    }
}

#[cfg(test)]
#[path = "control_plane_tests.rs"]
mod tests;
