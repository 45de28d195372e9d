//! Top-level help and usage specs.

use crate::prelude::*;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_both_subcommands() {
    loom()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("runner"))
        .stdout(predicate::str::contains("orchestrate"));
}

#[test]
fn runner_help_lists_its_four_verbs() {
    loom()
        .args(["runner", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("tail"))
        .stdout(predicate::str::contains("cancel"))
        .stdout(predicate::str::contains("stop"));
}

#[test]
fn missing_subcommand_exits_nonzero() {
    loom().assert().failure();
}

#[test]
fn orchestrate_without_required_flags_fails() {
    loom()
        .args(["orchestrate", "--design", "chip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
