use super::*;
use loom_core::protocol::{TimelineEvent, TimelineLevel};

fn entry(event: TimelineEvent) -> TimelineEntry {
    TimelineEntry {
        ts: "1700000000000".into(),
        job_id: "job-1".into(),
        level: TimelineLevel::Info,
        event,
        state: None,
        data: None,
    }
}

#[test]
fn appends_are_readable_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let writer = TimelineWriter::new(dir.path().join("job_timeline.jsonl"));
    writer.append(&entry(TimelineEvent::StateEnter)).unwrap();
    writer.append(&entry(TimelineEvent::Action)).unwrap();
    writer.append(&entry(TimelineEvent::Done)).unwrap();

    let entries = writer.read_all().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].event, TimelineEvent::StateEnter);
    assert_eq!(entries[2].event, TimelineEvent::Done);
}

#[test]
fn read_all_on_absent_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let writer = TimelineWriter::new(dir.path().join("job_timeline.jsonl"));
    assert!(writer.read_all().unwrap().is_empty());
}
