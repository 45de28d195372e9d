//! `loom runner cancel` specs.

use crate::prelude::*;

#[test]
fn cancel_with_request_id_writes_an_by_id_signal() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "cancel",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
            "--request-id",
            "req-7",
        ])
        .assert()
        .success();

    let contents = std::fs::read_to_string(run_dir.ctl_file("cancel.json")).unwrap();
    assert!(contents.contains("BY_ID"));
    assert!(contents.contains("req-7"));
}

#[test]
fn cancel_with_all_writes_a_current_scope_signal() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "cancel",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
            "--all",
        ])
        .assert()
        .success();

    let contents = std::fs::read_to_string(run_dir.ctl_file("cancel.json")).unwrap();
    assert!(contents.contains("CURRENT"));
}

#[test]
fn cancel_with_neither_flag_fails() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "cancel",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure();

    assert!(!run_dir.ctl_file("cancel.json").exists());
}

#[test]
fn cancel_with_both_flags_fails() {
    let run_dir = RunDirFixture::new();

    loom()
        .args([
            "runner",
            "cancel",
            "--session-dir",
            run_dir.path().to_str().unwrap(),
            "--all",
            "--request-id",
            "req-1",
        ])
        .assert()
        .failure();

    assert!(!run_dir.ctl_file("cancel.json").exists());
}
