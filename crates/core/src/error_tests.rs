use super::*;

#[test]
fn round_trips_through_json() {
    for e in [
        ErrorType::Ok,
        ErrorType::LocatorFail,
        ErrorType::ContractInvalid,
        ErrorType::SessionStartFail,
        ErrorType::ToolCrash,
        ErrorType::HeartbeatLost,
        ErrorType::QueueTimeout,
        ErrorType::RestoreFail,
        ErrorType::CmdFail,
        ErrorType::OutputMissing,
        ErrorType::OutputEmpty,
    ] {
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, format!("\"{}\"", e.as_str()));
        let back: ErrorType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}

#[test]
fn display_matches_wire_form() {
    assert_eq!(ErrorType::OutputMissing.to_string(), "OUTPUT_MISSING");
}
