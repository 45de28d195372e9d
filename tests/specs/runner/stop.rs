//! `loom runner stop` specs.

use crate::prelude::*;

#[test]
fn stop_without_force_writes_a_graceful_signal() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "stop",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = std::fs::read_to_string(run_dir.ctl_file("stop.json")).unwrap();
    assert!(contents.contains("GRACEFUL"));
}

#[test]
fn stop_with_force_writes_a_force_signal() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "stop",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
            "--force",
        ])
        .assert()
        .success();

    let contents = std::fs::read_to_string(run_dir.ctl_file("stop.json")).unwrap();
    assert!(contents.contains("FORCE"));
}
