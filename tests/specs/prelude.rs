//! Shared helpers for black-box CLI specs.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A `Command` for the `loom` binary, ready for `.arg(...)`.
pub fn loom() -> Command {
    Command::cargo_bin("loom").expect("loom binary should be built by the test harness")
}

/// A throwaway run-dir under a temp directory that is not yet a skeleton,
/// mirroring the state a fresh `--session-dir` is in before anything has
/// touched it.
pub struct RunDirFixture {
    _temp: TempDir,
    path: PathBuf,
}

impl RunDirFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("run");
        Self { _temp: temp, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ctl_file(&self, name: &str) -> PathBuf {
        self.path.join("ctl").join(name)
    }
}
