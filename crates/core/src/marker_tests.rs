use super::*;

#[test]
fn detects_marker_in_single_chunk() {
    let mut engine = MarkerEngine::new("__SP_DONE__", "req-1");
    assert!(!engine.feed(b"some output\n"));
    assert!(engine.feed(b"more output __SP_DONE__ req-1\ntrailer\n"));
}

#[test]
fn detects_marker_split_byte_by_byte() {
    let marker = "__SP_DONE__ req-7";
    let mut engine = MarkerEngine::new("__SP_DONE__", "req-7");
    let mut seen = false;
    for b in marker.as_bytes() {
        seen = engine.feed(&[*b]) || seen;
    }
    assert!(seen);
}

#[test]
fn does_not_false_positive_on_partial_prefix() {
    let mut engine = MarkerEngine::new("__SP_DONE__", "req-1");
    assert!(!engine.feed(b"__SP_DONE__ req-"));
    assert!(!engine.feed(b"2 unrelated"));
}

#[test]
fn sticky_once_found() {
    let mut engine = MarkerEngine::new("__SP_DONE__", "req-1");
    assert!(engine.feed(b"__SP_DONE__ req-1"));
    assert!(engine.feed(b"anything at all"));
}

#[test]
fn bounds_buffer_growth_on_long_non_matching_stream() {
    let mut engine = MarkerEngine::new("__SP_DONE__", "req-1");
    let chunk = vec![b'x'; 4096];
    for _ in 0..20 {
        assert!(!engine.feed(&chunk));
    }
    assert!(engine.tail.len() <= MAX_BUFFER);
}

proptest::proptest! {
    #[test]
    fn found_for_any_chunking_containing_marker(
        prefix_junk in proptest::collection::vec(0u8..255, 0..200),
        suffix_junk in proptest::collection::vec(0u8..255, 0..200),
        chunk_size in 1usize..17,
    ) {
        let marker = b"__SP_DONE__ tok42".to_vec();
        let mut stream = prefix_junk.clone();
        stream.extend_from_slice(&marker);
        stream.extend_from_slice(&suffix_junk);

        let mut engine = MarkerEngine::new("__SP_DONE__", "tok42");
        let mut seen = false;
        for chunk in stream.chunks(chunk_size) {
            seen = engine.feed(chunk) || seen;
        }
        proptest::prop_assert!(seen);
    }
}
