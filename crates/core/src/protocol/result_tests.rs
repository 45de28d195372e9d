use super::*;

fn sample() -> SessionResult {
    SessionResult {
        schema_version: SCHEMA_VERSION.to_string(),
        request_id: "req-1".into(),
        job_id: "job-1".into(),
        status: ResultStatus::Pass,
        error_type: ErrorType::Ok,
        exit_reason: Some(ExitReason::MarkerSeen),
        message: "ok".into(),
        started_at: "1700000000000".into(),
        finished_at: "1700000000100".into(),
        output_path: Some("output/req-1.out".into()),
        tail_path: None,
        evidence_paths: vec![],
        stats: None,
    }
}

#[test]
fn round_trips_through_json() {
    let result = sample();
    let bytes = result.to_json().unwrap();
    let back = SessionResult::from_json(&bytes).unwrap();
    assert_eq!(back.request_id, result.request_id);
    assert_eq!(back.status, ResultStatus::Pass);
    assert_eq!(back.exit_reason, Some(ExitReason::MarkerSeen));
}

#[test]
fn status_serializes_uppercase() {
    let json = serde_json::to_string(&ResultStatus::Timeout).unwrap();
    assert_eq!(json, "\"TIMEOUT\"");
}

#[test]
fn is_pass_reflects_status() {
    let mut result = sample();
    assert!(result.is_pass());
    result.status = ResultStatus::Cancelled;
    assert!(!result.is_pass());
}

#[test]
fn file_name_is_request_id_json() {
    assert_eq!(sample().file_name(), "req-1.json");
}
