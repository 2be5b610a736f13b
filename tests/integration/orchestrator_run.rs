//! End-to-end orchestrator runs against a mock dispatcher

use crate::support::{test_config, test_resources, MockDispatcher};
use analytics_traffic_simulator::checkpoint;
use analytics_traffic_simulator::config::RunConfiguration;
use analytics_traffic_simulator::orchestrator::{RunOrchestrator, SimulatorError};
use analytics_traffic_simulator::provision::{NoopSettings, StaticProvisioner};
use analytics_traffic_simulator::stop::StopController;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

fn orchestrator(config: RunConfiguration, dispatcher: MockDispatcher) -> RunOrchestrator {
    RunOrchestrator::new(
        config,
        Arc::new(StaticProvisioner::new(test_resources())),
        Arc::new(NoopSettings),
    )
    .with_dispatcher(Arc::new(dispatcher))
}

#[tokio::test]
async fn test_run_reaches_target_and_completes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "full_run", 500);

    let summary = orchestrator(config, MockDispatcher::new())
        .run()
        .await
        .unwrap();

    assert!(!summary.paused);
    assert_eq!(summary.processed, 500);
    assert_eq!(summary.successful, 500);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.failed, 0);

    let listed = checkpoint::list(dir.path());
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].identifier, "full_run");
    assert_eq!(listed[0].status, "completed");
    assert_eq!(listed[0].processed, 500);
    assert_eq!(listed[0].attempts, 1);
}

#[tokio::test]
async fn test_counter_identity_with_adversarial_mix() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), "mixed_run", 500);
    config.invalid_ratio = 0.2;
    config.attack_ratio = 0.1;

    let summary = orchestrator(config, MockDispatcher::rejecting_adversarial())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.processed, 500);
    assert_eq!(
        summary.processed,
        summary.successful + summary.failed + summary.rejected
    );
    assert!(summary.invalid_sent > 0, "invalid class never drawn");
    assert!(summary.attack_sent > 0, "attack class never drawn");
    // The mock rejects exactly the adversarial classes
    assert_eq!(summary.rejected, summary.invalid_sent + summary.attack_sent);
}

#[tokio::test]
async fn test_failed_run_resumes_from_checkpoint() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "resumable", 500);

    // First attempt: the outcome stream dies after 200 of 500
    let err = orchestrator(config.clone(), MockDispatcher::truncating(200))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SimulatorError::StreamEndedEarly {
            received: 200,
            expected: 500
        }
    ));

    let listed = checkpoint::list(dir.path());
    assert_eq!(listed[0].status, "failed");
    assert_eq!(listed[0].processed, 200);

    // Second attempt resumes and only sends the remainder
    let dispatcher = MockDispatcher::new();
    let sent = dispatcher.sent_counter();
    let summary = orchestrator(config, dispatcher).run().await.unwrap();

    assert!(!summary.paused);
    assert_eq!(summary.processed, 500, "counters are cumulative");
    assert_eq!(sent.load(Ordering::SeqCst), 300, "completed work not re-sent");

    let listed = checkpoint::list(dir.path());
    assert_eq!(listed[0].status, "completed");
    assert_eq!(listed[0].attempts, 2);
}

#[tokio::test]
async fn test_config_change_restarts_from_zero() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "reconfigured", 500);

    orchestrator(config.clone(), MockDispatcher::truncating(200))
        .run()
        .await
        .unwrap_err();

    // Changing a mix ratio invalidates the stored progress
    let mut changed = config;
    changed.attack_ratio = 0.3;
    let dispatcher = MockDispatcher::new();
    let sent = dispatcher.sent_counter();
    let summary = orchestrator(changed, dispatcher).run().await.unwrap();

    assert_eq!(summary.processed, 500);
    assert_eq!(
        sent.load(Ordering::SeqCst),
        500,
        "full target re-sent after reset"
    );

    let listed = checkpoint::list(dir.path());
    assert_eq!(listed[0].attempts, 2, "attempt history survives the reset");
}

#[tokio::test]
async fn test_midrun_stop_pauses_then_resumes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "pausable", 500);

    let stop = StopController::shared();
    let summary = orchestrator(
        config.clone(),
        MockDispatcher::stopping_after(100, stop.clone()),
    )
    .with_stop(stop)
    .run()
    .await
    .unwrap();

    assert!(summary.paused, "cooperative stop is not an error");
    assert_eq!(summary.processed, 100);

    let listed = checkpoint::list(dir.path());
    assert_eq!(listed[0].status, "paused");
    assert_eq!(listed[0].processed, 100);

    // Resume without a stop request runs to completion
    let dispatcher = MockDispatcher::new();
    let sent = dispatcher.sent_counter();
    let summary = orchestrator(config, dispatcher)
        .with_stop(StopController::shared())
        .run()
        .await
        .unwrap();

    assert!(!summary.paused);
    assert_eq!(summary.processed, 500);
    assert_eq!(sent.load(Ordering::SeqCst), 400);
}

#[tokio::test]
async fn test_completed_run_reruns_fresh_under_same_name() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "repeat", 500);

    orchestrator(config.clone(), MockDispatcher::new())
        .run()
        .await
        .unwrap();

    // Completed checkpoints are never resumed; the rerun sends everything
    let dispatcher = MockDispatcher::new();
    let sent = dispatcher.sent_counter();
    let summary = orchestrator(config, dispatcher).run().await.unwrap();

    assert_eq!(summary.processed, 500);
    assert_eq!(sent.load(Ordering::SeqCst), 500);
}

#[tokio::test]
async fn test_no_resources_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), "empty_target", 100);

    let err = RunOrchestrator::new(
        config,
        Arc::new(StaticProvisioner::new(Vec::new())),
        Arc::new(NoopSettings),
    )
    .with_dispatcher(Arc::new(MockDispatcher::new()))
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, SimulatorError::NoResources));
}

#[tokio::test]
async fn test_invalid_configuration_rejected_before_any_work() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), "bad_config", 100);
    config.endpoint = String::new();

    let dispatcher = MockDispatcher::new();
    let sent = dispatcher.sent_counter();
    let err = orchestrator(config, dispatcher).run().await.unwrap_err();

    assert!(matches!(err, SimulatorError::ValidationError(_)));
    assert_eq!(sent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disabled_checkpoints_leave_no_documents() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), "ephemeral", 500);
    config.checkpoints_enabled = false;

    let summary = orchestrator(config, MockDispatcher::new())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.processed, 500);
    assert!(checkpoint::list(dir.path()).is_empty());
}
