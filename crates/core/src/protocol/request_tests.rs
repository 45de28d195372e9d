use super::*;

fn sample() -> Request {
    Request {
        schema_version: SCHEMA_VERSION.to_string(),
        request_id: "req-1".into(),
        job_id: "job-1".into(),
        seq: 1,
        kind: "tcl".into(),
        payload: "puts \"hi\"".into(),
        timeout_s: None,
        cancel_policy: CancelPolicy::CtrlC,
        marker: Marker {
            prefix: "__SP_DONE__".into(),
            token: "req-1".into(),
            mode: MarkerMode::RunnerInject,
        },
        created_at: "1700000000000".into(),
    }
}

#[test]
fn round_trips_through_json() {
    let req = sample();
    let bytes = req.to_json().unwrap();
    let back = Request::from_json(&bytes).unwrap();
    assert_eq!(req, back);
}

#[test]
fn default_timeout_is_300s() {
    let req = sample();
    assert_eq!(req.effective_timeout_s(), 300);
}

#[test]
fn explicit_timeout_overrides_default() {
    let mut req = sample();
    req.timeout_s = Some(5);
    assert_eq!(req.effective_timeout_s(), 5);
}

#[test]
fn file_name_follows_seq_and_id() {
    let req = sample();
    assert_eq!(req.file_name(), "cmd_1_req-1.json");
}

#[test]
fn marker_text_joins_prefix_and_token() {
    let req = sample();
    assert_eq!(req.marker_text(), "__SP_DONE__ req-1");
}

#[test]
fn missing_kind_defaults_to_tcl() {
    let json = serde_json::json!({
        "schema_version": "1.0",
        "request_id": "r1",
        "job_id": "j1",
        "seq": 1,
        "payload": "puts hi",
        "marker": {"prefix": "__SP_DONE__", "token": "r1", "mode": "runner_inject"},
        "created_at": "1"
    });
    let req: Request = serde_json::from_value(json).unwrap();
    assert_eq!(req.kind, "tcl");
}
