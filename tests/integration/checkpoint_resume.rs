//! Checkpoint persistence and resume behavior through the public API

use analytics_traffic_simulator::checkpoint::{
    CheckpointError, CheckpointState, CheckpointStatus, CheckpointStore,
};
use analytics_traffic_simulator::config::RunConfiguration;
use analytics_traffic_simulator::identifier::RunIdentifier;
use analytics_traffic_simulator::{DataClass, RequestStatus};
use std::path::Path;
use tempfile::TempDir;

fn config(dir: &Path) -> RunConfiguration {
    RunConfiguration {
        endpoint: "http://localhost/track".to_string(),
        target: 1000,
        checkpoint_dir: dir.to_path_buf(),
        ..RunConfiguration::default()
    }
}

#[test]
fn test_document_shape_on_disk() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("shape_check").unwrap();
    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config(dir.path()));
    store.record_processed(RequestStatus::Success, DataClass::Normal);
    store.pause();

    let contents = std::fs::read_to_string(store.path()).unwrap();
    let document: serde_json::Value = serde_json::from_str(&contents).unwrap();

    assert_eq!(document["version"], "1.0.0");
    assert_eq!(document["status"], "paused");
    assert_eq!(document["identifier"], "shape_check");
    assert_eq!(document["processed"], 1);
    assert_eq!(document["successful"], 1);
    assert_eq!(document["target"], 1000);
    assert!(document["config_hash"].as_str().unwrap().len() == 64);
    assert_eq!(document["runs"].as_array().unwrap().len(), 1);
}

#[test]
fn test_no_staging_file_left_after_save() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("tmp_check").unwrap();
    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config(dir.path()));
    store.pause();

    assert!(store.path().exists());
    assert!(!store.path().with_extension("json.tmp").exists());
}

#[test]
fn test_completed_document_is_not_resumable() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("terminal").unwrap();
    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config(dir.path()));
    store.record_processed(RequestStatus::Success, DataClass::Normal);
    store.mark_complete();

    match CheckpointState::load(store.path()) {
        Err(CheckpointError::Completed) => {}
        other => panic!("Expected Completed refusal, got {other:?}"),
    }
}

#[test]
fn test_failed_document_remains_inspectable_and_resumable() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("crashed").unwrap();
    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config(dir.path()));
    store.record_processed(RequestStatus::Failed, DataClass::Normal);
    store.mark_failed("endpoint unreachable");

    let loaded = CheckpointState::load(store.path()).unwrap();
    assert_eq!(loaded.status(), CheckpointStatus::Failed);
    assert_eq!(
        loaded.runs().last().unwrap().error.as_deref(),
        Some("endpoint unreachable")
    );
}

#[test]
fn test_elapsed_time_accumulates_across_attempts() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("timed").unwrap();
    let config = config(dir.path());

    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config);
    std::thread::sleep(std::time::Duration::from_millis(20));
    store.record_processed(RequestStatus::Success, DataClass::Normal);
    store.pause();
    let first = store.state().elapsed_seconds();
    assert!(first > 0.0);

    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config);
    std::thread::sleep(std::time::Duration::from_millis(20));
    store.record_processed(RequestStatus::Success, DataClass::Normal);
    store.pause();
    assert!(store.state().elapsed_seconds() > first);
}

#[test]
fn test_attempt_records_resume_flag_and_boundaries() {
    let dir = TempDir::new().unwrap();
    let identifier = RunIdentifier::new("attempts").unwrap();
    let config = config(dir.path());

    let mut store = CheckpointStore::initialize(dir.path(), &identifier, &config);
    for _ in 0..3 {
        store.record_processed(RequestStatus::Success, DataClass::Normal);
    }
    store.pause();

    let store = CheckpointStore::initialize(dir.path(), &identifier, &config);
    let runs = store.state().runs();
    assert_eq!(runs.len(), 2);
    assert!(!runs[0].resumed);
    assert_eq!(runs[0].processed_start, 0);
    assert_eq!(runs[0].processed_end, Some(3));
    assert!(runs[1].resumed);
    assert_eq!(runs[1].processed_start, 3);
    assert_eq!(runs[1].processed_end, None, "second attempt still open");
}
