use std::path::PathBuf;
use std::sync::Arc;

use loom_adapters::FakeToolAdapter;
use loom_core::protocol::request::{CancelPolicy, Marker, MarkerMode};
use loom_core::protocol::{CancelScope, CancelSignal, Request, ResultStatus};
use loom_core::SequentialIdGen;
use loom_storage::RunDir;

use super::*;

fn fresh_run_dir() -> (tempfile::TempDir, RunDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let run_dir = RunDir::new(dir.path());
    run_dir.create_skeleton().expect("skeleton");
    (dir, run_dir)
}

fn sample_request(seq: u64, marker_token: &str) -> Request {
    Request {
        schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
        request_id: format!("req-{seq}"),
        job_id: "job-1".to_string(),
        seq,
        kind: "tcl".to_string(),
        payload: "run_place_opt".to_string(),
        timeout_s: Some(2),
        cancel_policy: CancelPolicy::CtrlC,
        marker: Marker {
            prefix: "__LOOM_DONE__".to_string(),
            token: marker_token.to_string(),
            mode: MarkerMode::RunnerInject,
        },
        created_at: "0".to_string(),
    }
}

fn runner(run_dir: RunDir, adapter: Arc<FakeToolAdapter>) -> SessionRunner<FakeToolAdapter> {
    let config = RunnerConfig::new(vec!["innovus".to_string()], PathBuf::from("/work"))
        .with_heartbeat_interval(Duration::from_millis(50))
        .without_lease();
    SessionRunner::new(run_dir, config, adapter, &SequentialIdGen::new("sess"))
}

fn enqueue(run_dir: &RunDir, request: &Request) {
    let bytes = request.to_json().expect("serialize request");
    control_plane::write_atomic(&run_dir.queue_dir().join(request.file_name()), &bytes)
        .expect("write request");
}

#[tokio::test]
async fn happy_path_marker_seen_yields_pass() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let r = runner(run_dir.clone(), adapter.clone());
    r.start().await.expect("start");

    let request = sample_request(1, "abc123");
    enqueue(&run_dir, &request);
    adapter.push_output(format!("some tool chatter\n__LOOM_DONE__ abc123\n"));

    let name = r.next_queued_request_name().expect("list queue").expect("one entry");
    r.process_one_request(&name).await.expect("process request");

    let result_path = run_dir.result_dir().join("req-1.json");
    let raw = control_plane::read_bytes(&result_path).expect("read result").expect("result exists");
    let result = SessionResult::from_json(&raw).expect("parse result");
    assert_eq!(result.status, ResultStatus::Pass);
    assert!(!run_dir.inflight_dir().join(name).exists());
}

#[tokio::test]
async fn marker_split_across_chunks_is_still_detected() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let r = runner(run_dir.clone(), adapter.clone());
    r.start().await.expect("start");

    let request = sample_request(1, "xyz");
    enqueue(&run_dir, &request);
    adapter.push_output("prefix output __LOOM_DO");
    adapter.push_output("NE__ xyz\n");

    let name = r.next_queued_request_name().expect("list queue").expect("one entry");
    r.process_one_request(&name).await.expect("process request");

    let result_path = run_dir.result_dir().join("req-1.json");
    let raw = control_plane::read_bytes(&result_path).expect("read result").expect("result exists");
    let result = SessionResult::from_json(&raw).expect("parse result");
    assert_eq!(result.status, ResultStatus::Pass);
}

#[tokio::test]
async fn timeout_fires_when_marker_never_arrives() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let r = runner(run_dir.clone(), adapter.clone());
    r.start().await.expect("start");

    let mut request = sample_request(1, "never");
    request.timeout_s = Some(0);
    enqueue(&run_dir, &request);

    let name = r.next_queued_request_name().expect("list queue").expect("one entry");
    r.process_one_request(&name).await.expect("process request");

    let result_path = run_dir.result_dir().join("req-1.json");
    let raw = control_plane::read_bytes(&result_path).expect("read result").expect("result exists");
    let result = SessionResult::from_json(&raw).expect("parse result");
    assert_eq!(result.status, ResultStatus::Timeout);
}

#[tokio::test]
async fn idempotent_when_result_already_exists() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let r = runner(run_dir.clone(), adapter.clone());
    r.start().await.expect("start");

    let request = sample_request(1, "abc");
    let prior = SessionResult {
        schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
        request_id: request.request_id.clone(),
        job_id: request.job_id.clone(),
        status: ResultStatus::Pass,
        error_type: loom_core::ErrorType::Ok,
        exit_reason: None,
        message: "already done".to_string(),
        started_at: "0".to_string(),
        finished_at: "1".to_string(),
        output_path: None,
        tail_path: None,
        evidence_paths: Vec::new(),
        stats: None,
    };
    control_plane::write_atomic(
        &run_dir.result_dir().join(format!("{}.json", request.request_id)),
        &prior.to_json().expect("serialize"),
    )
    .expect("seed result");
    enqueue(&run_dir, &request);

    let name = r.next_queued_request_name().expect("list queue").expect("one entry");
    r.process_one_request(&name).await.expect("process request");

    assert!(adapter.calls().iter().all(|c| !matches!(c, loom_adapters::ToolCall::Write { .. })));
    assert!(!run_dir.queue_dir().join(name).exists());
}

#[tokio::test]
async fn cancel_current_yields_cancelled_result() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let r = runner(run_dir.clone(), adapter.clone());
    r.start().await.expect("start");

    let mut request = sample_request(1, "forever");
    request.timeout_s = Some(30);
    enqueue(&run_dir, &request);

    let cancel = CancelSignal {
        scope: CancelScope::Current,
        request_id: None,
    };
    control_plane::write_atomic(&run_dir.cancel_file(), &cancel.to_json().expect("serialize"))
        .expect("write cancel");

    let name = r.next_queued_request_name().expect("list queue").expect("one entry");
    r.process_one_request(&name).await.expect("process request");

    let result_path = run_dir.result_dir().join("req-1.json");
    let raw = control_plane::read_bytes(&result_path).expect("read result").expect("result exists");
    let result = SessionResult::from_json(&raw).expect("parse result");
    assert_eq!(result.status, ResultStatus::Cancelled);
    assert!(adapter
        .calls()
        .iter()
        .any(|c| matches!(c, loom_adapters::ToolCall::SignalByte { byte: 0x03 })));
    assert!(!run_dir.cancel_file().exists());
}

#[tokio::test]
async fn second_runner_cannot_start_against_a_locked_run_dir() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let first = runner(run_dir.clone(), adapter.clone());
    first.start().await.expect("first start");

    let second = runner(run_dir.clone(), adapter);
    let err = second.start().await.expect_err("second start should fail");
    assert!(matches!(err, RunnerError::Lock(_)));
}

#[tokio::test]
async fn recover_inflight_requeues_on_start() {
    let (_dir, run_dir) = fresh_run_dir();
    let adapter = Arc::new(FakeToolAdapter::new());
    let request = sample_request(7, "whatever");
    let bytes = request.to_json().expect("serialize");
    control_plane::write_atomic(&run_dir.inflight_dir().join(request.file_name()), &bytes)
        .expect("seed inflight");

    let r = runner(run_dir.clone(), adapter);
    r.start().await.expect("start");

    assert!(!run_dir.inflight_dir().join(request.file_name()).exists());
    assert!(run_dir.queue_dir().join(request.file_name()).exists());
}
