use super::*;

#[test]
fn markdown_includes_status_and_error_type() {
    let summary = Summary {
        job_id: "job-1".into(),
        status: "FAIL".into(),
        error_type: Some(ErrorType::OutputMissing),
        design: Some("chip_top".into()),
        skill: Some("place_and_route".into()),
        metrics: serde_json::json!({}),
        artifacts: vec!["reports/summary.txt".into()],
    };
    let md = summary.to_markdown();
    assert!(md.contains("# Job job-1"));
    assert!(md.contains("status**: FAIL"));
    assert!(md.contains("OUTPUT_MISSING"));
    assert!(md.contains("chip_top"));
    assert!(md.contains("reports/summary.txt"));
}

#[test]
fn markdown_omits_absent_optional_fields() {
    let summary = Summary {
        job_id: "job-2".into(),
        status: "PASS".into(),
        error_type: None,
        design: None,
        skill: None,
        metrics: serde_json::json!({}),
        artifacts: vec![],
    };
    let md = summary.to_markdown();
    assert!(!md.contains("error_type"));
    assert!(!md.contains("Artifacts"));
}

#[test]
fn to_json_round_trips() {
    let summary = Summary {
        job_id: "job-1".into(),
        status: "PASS".into(),
        error_type: None,
        design: None,
        skill: None,
        metrics: serde_json::json!({"duration_ms": 42}),
        artifacts: vec![],
    };
    let bytes = summary.to_json().unwrap();
    let back: Summary = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back.job_id, "job-1");
}
