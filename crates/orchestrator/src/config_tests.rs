use super::*;

#[test]
fn defaults_match_spec_budgets() {
    let config = OrchestratorConfig::new("/skills");
    assert_eq!(config.session_ready_timeout, Duration::from_secs(30));
    assert_eq!(config.ack_timeout, Duration::from_secs(300));
    assert_eq!(config.scan_depth, 3);
}

#[test]
fn builders_override_defaults() {
    let config = OrchestratorConfig::new("/skills")
        .with_session_ready_timeout(Duration::from_secs(10))
        .with_ack_timeout(Duration::from_secs(60));
    assert_eq!(config.session_ready_timeout, Duration::from_secs(10));
    assert_eq!(config.ack_timeout, Duration::from_secs(60));
}
