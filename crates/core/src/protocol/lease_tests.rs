use super::*;

#[test]
fn not_expired_before_deadline() {
    let lease = Lease {
        lease_id: "l1".into(),
        expires_at: "1700000000000".into(),
        owner: "orchestrator".into(),
    };
    assert!(!lease.is_expired(1699999999999));
}

#[test]
fn expired_at_or_after_deadline() {
    let lease = Lease {
        lease_id: "l1".into(),
        expires_at: "1700000000000".into(),
        owner: "orchestrator".into(),
    };
    assert!(lease.is_expired(1700000000000));
    assert!(lease.is_expired(1700000000001));
}

#[test]
fn accepts_iso8601_expiry() {
    let lease = Lease {
        lease_id: "l1".into(),
        expires_at: "2023-11-14T22:13:20Z".into(),
        owner: "orchestrator".into(),
    };
    assert!(lease.is_expired(1700000000000));
    assert!(!lease.is_expired(1699999999999));
}

#[test]
fn unparseable_expiry_is_treated_as_expired() {
    let lease = Lease {
        lease_id: "l1".into(),
        expires_at: "garbage".into(),
        owner: "orchestrator".into(),
    };
    assert!(lease.is_expired(0));
}

#[test]
fn round_trips_through_json() {
    let lease = Lease {
        lease_id: "l1".into(),
        expires_at: "1700000000000".into(),
        owner: "orchestrator".into(),
    };
    let bytes = lease.to_json().unwrap();
    let back = Lease::from_json(&bytes).unwrap();
    assert_eq!(lease, back);
}
