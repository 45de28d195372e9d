use super::*;
use loom_core::protocol::RequiredOutput;

fn contract(outputs: Vec<RequiredOutput>, hints: Vec<&str>) -> Contract {
    Contract {
        required_outputs: outputs,
        debug_hints: hints.into_iter().map(String::from).collect(),
    }
}

fn output(glob: &str, non_empty: bool) -> RequiredOutput {
    RequiredOutput {
        path_glob: glob.to_string(),
        non_empty,
    }
}

#[test]
fn static_validation_rejects_empty_outputs() {
    let c = contract(vec![], vec!["a", "b"]);
    assert!(validate_static(&c).is_err());
}

#[test]
fn static_validation_rejects_path_outside_reports() {
    let c = contract(vec![output("out/result.txt", false)], vec!["a", "b"]);
    let err = validate_static(&c).unwrap_err();
    assert!(err.contains("reports/"));
}

#[test]
fn static_validation_rejects_traversal() {
    let c = contract(vec![output("reports/../secret", false)], vec!["a", "b"]);
    assert!(validate_static(&c).is_err());
}

#[test]
fn static_validation_rejects_absolute_path() {
    let c = contract(vec![output("/etc/passwd", false)], vec!["a", "b"]);
    assert!(validate_static(&c).is_err());
}

#[test]
fn static_validation_requires_two_debug_hints() {
    let c = contract(vec![output("reports/out.txt", false)], vec!["only one"]);
    assert!(validate_static(&c).is_err());
}

#[test]
fn static_validation_accepts_well_formed_contract() {
    let c = contract(vec![output("reports/out.txt", true)], vec!["a", "b"]);
    assert!(validate_static(&c).is_ok());
}

#[test]
fn validate_outputs_detects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let c = contract(vec![output("reports/out.txt", false)], vec!["a", "b"]);
    let err = validate_outputs(&c, dir.path()).unwrap_err();
    assert_eq!(err.0, ErrorType::OutputMissing);
}

#[test]
fn validate_outputs_detects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("out.txt"), b"").unwrap();
    let c = contract(vec![output("reports/out.txt", true)], vec!["a", "b"]);
    let err = validate_outputs(&c, dir.path()).unwrap_err();
    assert_eq!(err.0, ErrorType::OutputEmpty);
}

#[test]
fn validate_outputs_passes_when_non_empty_present() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("out.txt"), b"data").unwrap();
    let c = contract(vec![output("reports/out.txt", true)], vec!["a", "b"]);
    let checks = validate_outputs(&c, dir.path()).unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, OutputStatus::Ok);
}

#[test]
fn validate_outputs_matches_glob() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.rpt"), b"x").unwrap();
    std::fs::write(dir.path().join("b.rpt"), b"x").unwrap();
    let c = contract(vec![output("reports/*.rpt", true)], vec!["a", "b"]);
    let checks = validate_outputs(&c, dir.path()).unwrap();
    assert_eq!(checks[0].matched_files.len(), 2);
}

#[test]
fn missing_dominates_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("present.txt"), b"").unwrap();
    let c = contract(
        vec![
            output("reports/present.txt", true),
            output("reports/absent.txt", false),
        ],
        vec!["a", "b"],
    );
    let err = validate_outputs(&c, dir.path()).unwrap_err();
    assert_eq!(err.0, ErrorType::OutputMissing);
}
