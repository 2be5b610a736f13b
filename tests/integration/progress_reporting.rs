//! Progress snapshot derivation as the orchestrator uses it

use analytics_traffic_simulator::orchestrator::config::progress_cadence;
use analytics_traffic_simulator::orchestrator::ProgressSnapshot;
use std::time::Duration;

#[test]
fn test_cadence_tracks_one_percent_of_target() {
    assert_eq!(progress_cadence(1_000), 100, "floor applies to small runs");
    assert_eq!(progress_cadence(50_000), 500);
    assert_eq!(progress_cadence(1_000_000), 1000, "ceiling for huge runs");
    assert_eq!(progress_cadence(0), 100);
}

#[test]
fn test_snapshot_over_resumed_counters() {
    // A resumed run reports cumulative progress, not per-attempt progress
    let snap = ProgressSnapshot::from_counters(750, 700, 1000, 30.0);
    assert_eq!(snap.percent, 75.0);
    assert_eq!(snap.rate, Some(25.0));
    assert_eq!(snap.eta, Some(Duration::from_secs(10)));
}

#[test]
fn test_estimates_withheld_on_tiny_samples() {
    let early = ProgressSnapshot::from_counters(50, 50, 10_000, 120.0);
    assert!(early.rate.is_none());
    assert!(early.eta.is_none());
    // Percent and success rate are always available
    assert_eq!(early.percent, 0.5);
    assert_eq!(early.success_rate, 1.0);
}

#[test]
fn test_progress_line_is_complete_for_logging() {
    let snap = ProgressSnapshot::from_counters(2_500, 2_400, 10_000, 50.0);
    let line = snap.format_progress();
    assert!(line.contains("2500/10000"));
    assert!(line.contains("25.0% complete"));
    assert!(line.contains("96.0% ok"));
    assert!(line.contains("50 req/sec"));
    assert!(line.contains("remaining"));
}

#[test]
fn test_percent_never_exceeds_hundred() {
    // Overshoot can happen when a resumed target shrank via config change
    let snap = ProgressSnapshot::from_counters(1_200, 1_200, 1_000, 10.0);
    assert_eq!(snap.percent, 100.0);
}
