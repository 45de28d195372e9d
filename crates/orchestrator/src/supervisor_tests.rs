use super::*;
use test_support::FakeSupervisor;

use std::sync::Arc;

use loom_adapters::FakeToolAdapter;
use loom_core::protocol::request::{CancelPolicy, Marker, MarkerMode};
use loom_core::protocol::{Request, SessionResult};
use loom_storage::control_plane;

#[test]
fn process_supervisor_defaults_to_the_runner_binary_name() {
    let supervisor = ProcessSupervisor::default();
    assert_eq!(supervisor.runner_bin, PathBuf::from("loom-runner"));
}

fn sample_request(seq: u64, request_id: &str, token: &str) -> Request {
    Request {
        schema_version: loom_core::protocol::SCHEMA_VERSION.to_string(),
        request_id: request_id.to_string(),
        job_id: "job-1".to_string(),
        seq,
        kind: "tcl".to_string(),
        payload: "restore_design /tmp/chip.enc.dat\n".to_string(),
        timeout_s: Some(5),
        cancel_policy: CancelPolicy::CtrlC,
        marker: Marker {
            prefix: "LOOM_DONE".to_string(),
            token: token.to_string(),
            mode: MarkerMode::RunnerInject,
        },
        created_at: loom_core::time_fmt::now_millis_string(),
    }
}

#[tokio::test]
async fn fake_supervisor_drives_a_real_runner_against_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = RunDir::new(dir.path());
    run_dir.create_skeleton().unwrap();

    let adapter = Arc::new(FakeToolAdapter::new());
    let supervisor = FakeSupervisor::new(adapter.clone());
    let launch = SessionLaunch {
        argv: vec!["tool".to_string()],
        cwd: dir.path().to_path_buf(),
        boot_commands: Vec::new(),
        heartbeat_interval: Duration::from_secs(5),
        enable_lease: false,
    };

    let mut handle = supervisor.start(&run_dir, &launch).await.unwrap();

    let request = sample_request(1, "req-1", "tok-1");
    let bytes = request.to_json().unwrap();
    control_plane::write_atomic(&run_dir.queue_dir().join(request.file_name()), &bytes).unwrap();
    adapter.push_output("restoring...\nLOOM_DONE tok-1\n");

    let result_path = run_dir.result_dir().join("req-1.json");
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    let result = loop {
        if let Ok(Some(bytes)) = control_plane::read_bytes(&result_path) {
            break SessionResult::from_json(&bytes).unwrap();
        }
        assert!(std::time::Instant::now() < deadline, "result never appeared");
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    assert!(result.is_pass());
    handle.stop().await;
}
