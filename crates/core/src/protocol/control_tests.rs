use super::*;

#[test]
fn current_scope_targets_any_request() {
    let signal = CancelSignal {
        scope: CancelScope::Current,
        request_id: None,
    };
    assert!(signal.targets("req-1"));
    assert!(signal.targets("req-anything"));
}

#[test]
fn by_id_scope_targets_only_matching_id() {
    let signal = CancelSignal {
        scope: CancelScope::ById,
        request_id: Some("req-1".into()),
    };
    assert!(signal.targets("req-1"));
    assert!(!signal.targets("req-2"));
}

#[test]
fn cancel_signal_round_trips() {
    let signal = CancelSignal {
        scope: CancelScope::ById,
        request_id: Some("req-9".into()),
    };
    let bytes = signal.to_json().unwrap();
    let back = CancelSignal::from_json(&bytes).unwrap();
    assert_eq!(signal, back);
}

#[test]
fn by_id_scope_serializes_to_the_wire_exact_value() {
    let signal = CancelSignal {
        scope: CancelScope::ById,
        request_id: Some("req-9".into()),
    };
    let bytes = signal.to_json().unwrap();
    let json = String::from_utf8(bytes).unwrap();
    assert!(json.contains("\"BY_ID\""));
}

#[test]
fn current_scope_serializes_to_the_wire_exact_value() {
    let signal = CancelSignal {
        scope: CancelScope::Current,
        request_id: None,
    };
    let bytes = signal.to_json().unwrap();
    let json = String::from_utf8(bytes).unwrap();
    assert!(json.contains("\"CURRENT\""));
}

#[test]
fn stop_signal_round_trips() {
    let signal = StopSignal {
        mode: StopMode::Force,
    };
    let bytes = signal.to_json().unwrap();
    let back = StopSignal::from_json(&bytes).unwrap();
    assert_eq!(signal, back);
}
