// SPDX-License-Identifier: MIT

//! Advisory single-writer enforcement for a run-dir, backed by `fs2`.
//!
//! The control plane's actual mutual-exclusion unit is the run-dir
//! itself; `FsLock` wraps an flock on `<run_dir>/session/runner.lock`
//! so a crashed runner cannot leave a window for two live instances of
//! the same session.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsLockError {
    #[error("failed to open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("run-dir {path} is already locked by another runner")]
    AlreadyLocked { path: PathBuf },
}

/// A held advisory lock; the lock is released when this value is dropped.
pub struct FsLock {
    file: File,
    path: PathBuf,
}

impl FsLock {
    /// Attempts to acquire the lock at `path` without blocking. Returns
    /// `FsLockError::AlreadyLocked` if another process holds it.
    pub fn try_acquire(path: &Path) -> Result<Self, FsLockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FsLockError::Open {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .map_err(|e| FsLockError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(_) => Err(FsLockError::AlreadyLocked {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FsLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "fs_lock_tests.rs"]
mod tests;
