//! `loom runner tail` specs.

use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn tail_without_a_log_file_fails() {
    let run_dir = RunDirFixture::new();
    std::fs::create_dir_all(run_dir.path()).unwrap();

    loom()
        .args([
            "runner",
            "tail",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session log not found"));
}

#[test]
fn tail_without_follow_prints_existing_log_contents() {
    let run_dir = RunDirFixture::new();
    let log_dir = run_dir.path().join("log");
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join("session.out"), "hello from the tool\n").unwrap();

    loom()
        .args([
            "runner",
            "tail",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from the tool"));
}
