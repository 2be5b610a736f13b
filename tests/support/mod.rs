//! Shared test doubles for orchestrator-level tests

use analytics_traffic_simulator::dispatcher::{
    DispatchError, DispatcherStats, OutcomeStream, RequestDispatcher,
};
use analytics_traffic_simulator::provision::Resource;
use analytics_traffic_simulator::stop::SharedStop;
use analytics_traffic_simulator::{DataClass, RequestOutcome, RunConfiguration, TrackingRequest};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Base configuration pointed at a temp checkpoint directory.
pub fn test_config(dir: &Path, name: &str, target: u64) -> RunConfiguration {
    RunConfiguration {
        endpoint: "http://localhost/track".to_string(),
        target,
        run_name: Some(name.to_string()),
        checkpoint_dir: dir.to_path_buf(),
        seed: Some(7),
        ..RunConfiguration::default()
    }
}

/// A pair of trackable pages.
pub fn test_resources() -> Vec<Resource> {
    vec![
        Resource::new(1, "http://localhost/sample-page/", "Sample Page"),
        Resource::new(2, "http://localhost/other-page/", "Other Page"),
    ]
}

/// Dispatcher double that resolves every request without touching the
/// network. Outcomes are produced lazily, one per pull, matching the real
/// dispatcher's contract.
pub struct MockDispatcher {
    sent: Arc<AtomicU64>,
    truncate_after: Option<u64>,
    reject_adversarial: bool,
    stop_after: Option<(u64, SharedStop)>,
}

impl MockDispatcher {
    /// Every request succeeds.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(AtomicU64::new(0)),
            truncate_after: None,
            reject_adversarial: false,
            stop_after: None,
        }
    }

    /// End the outcome stream after `n` outcomes, violating the
    /// one-outcome-per-request contract the way a dying transport would.
    pub fn truncating(n: u64) -> Self {
        Self {
            truncate_after: Some(n),
            ..Self::new()
        }
    }

    /// Reject invalid and attack payloads, succeed on normal ones.
    pub fn rejecting_adversarial() -> Self {
        Self {
            reject_adversarial: true,
            ..Self::new()
        }
    }

    /// Request a cooperative stop while producing the `n`-th outcome.
    pub fn stopping_after(n: u64, stop: SharedStop) -> Self {
        Self {
            stop_after: Some((n, stop)),
            ..Self::new()
        }
    }

    /// Counter of requests this dispatcher has resolved.
    pub fn sent_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl RequestDispatcher for MockDispatcher {
    async fn stream_requests(
        &self,
        requests: Box<dyn Iterator<Item = TrackingRequest> + Send>,
        limit: u64,
    ) -> Result<OutcomeStream, DispatchError> {
        let take = self.truncate_after.map_or(limit, |n| n.min(limit));
        let sent = Arc::clone(&self.sent);
        let reject_adversarial = self.reject_adversarial;
        let stop_after = self.stop_after.clone();

        let outcomes = requests.take(take as usize).map(move |request| {
            let count = sent.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((n, stop)) = &stop_after {
                if count == *n {
                    stop.request_stop();
                }
            }
            if reject_adversarial && request.data_class != DataClass::Normal {
                RequestOutcome::rejected(request.data_class)
            } else {
                RequestOutcome::success(request.data_class)
            }
        });

        Ok(Box::pin(futures_util::stream::iter(outcomes)))
    }

    fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            requests_sent: self.sent.load(Ordering::SeqCst),
            ..DispatcherStats::default()
        }
    }
}
