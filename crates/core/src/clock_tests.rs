use super::*;

#[test]
fn fake_clock_only_moves_on_advance() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    assert_eq!(clock.now(), t0);
    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.now(), t0 + Duration::from_secs(5));
}

#[test]
fn fake_clock_set_overrides_advance() {
    let clock = FakeClock::new();
    clock.advance(Duration::from_secs(100));
    let target = Instant::now();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn clone_shares_underlying_state() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance(Duration::from_secs(1));
    assert_eq!(clock.now(), clone.now());
}
