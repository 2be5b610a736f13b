//! Concurrent HTTP dispatcher
//!
//! The orchestrator treats dispatch as a black box: it hands over a lazy
//! request sequence and drains a stream of outcomes, one await at a time.
//! All network concurrency lives here, behind [`RequestDispatcher`]. Outcomes
//! are yielded as requests complete, which is not necessarily submission
//! order; consumers must not assume FIFO.

use crate::orchestrator::config::calculate_backoff;
use crate::{RequestOutcome, TrackingRequest};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Stream of per-request outcomes from a dispatcher.
pub type OutcomeStream = Pin<Box<dyn Stream<Item = RequestOutcome> + Send>>;

/// Dispatcher errors
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// HTTP client could not be constructed
    #[error("client error: {0}")]
    ClientError(String),
}

/// Snapshot of dispatcher throughput statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatcherStats {
    /// Requests that have completed (any outcome)
    pub requests_sent: u64,
    /// Mean wall-clock time per request in milliseconds
    pub avg_time_ms: f64,
    /// Completed requests per second since the dispatcher was created
    pub requests_per_second: f64,
}

/// Concurrent submission engine consumed by the orchestrator.
///
/// Contract: every item pulled from the request sequence eventually yields
/// exactly one outcome. Per-request failures are outcomes, never errors.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    /// Stream up to `limit` requests from the lazy sequence, yielding
    /// outcomes as they complete.
    async fn stream_requests(
        &self,
        requests: Box<dyn Iterator<Item = TrackingRequest> + Send>,
        limit: u64,
    ) -> Result<OutcomeStream, DispatchError>;

    /// Throughput statistics accumulated so far.
    fn stats(&self) -> DispatcherStats;
}

#[derive(Debug)]
struct StatsInner {
    completed: u64,
    total_time: Duration,
    started: Instant,
}

/// HTTP dispatcher posting form payloads to the ingestion endpoint.
///
/// Fans out across `concurrency` in-flight requests via `buffer_unordered`,
/// applies connect/request timeouts at the client level, and retries 5xx and
/// transport errors with exponential backoff up to the retry budget. 4xx
/// responses are rejections, not retryable.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
    concurrency: usize,
    request_delay: Duration,
    max_retries: u32,
    stats: Arc<Mutex<StatsInner>>,
}

impl HttpDispatcher {
    /// Build a dispatcher for the given endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        concurrency: usize,
        connect_timeout: Duration,
        request_timeout: Duration,
        max_retries: u32,
        request_delay: Duration,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| DispatchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            concurrency: concurrency.max(1),
            request_delay,
            max_retries,
            stats: Arc::new(Mutex::new(StatsInner {
                completed: 0,
                total_time: Duration::ZERO,
                started: Instant::now(),
            })),
        })
    }

    async fn send_one(
        client: reqwest::Client,
        endpoint: String,
        request: TrackingRequest,
        max_retries: u32,
        request_delay: Duration,
        stats: Arc<Mutex<StatsInner>>,
    ) -> RequestOutcome {
        if !request_delay.is_zero() {
            tokio::time::sleep(request_delay).await;
        }

        let data_class = request.data_class;
        let started = Instant::now();
        let mut attempt = 0u32;
        let outcome = loop {
            let result = client.post(&endpoint).form(&request.fields).send().await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        break RequestOutcome::success(data_class);
                    }
                    if status.is_client_error() {
                        debug!(status = status.as_u16(), class = %data_class, "Request rejected");
                        break RequestOutcome::rejected(data_class);
                    }
                    // 5xx: retryable
                    if attempt >= max_retries {
                        break RequestOutcome::failed(
                            data_class,
                            format!("server error {} after {} retries", status, max_retries),
                        );
                    }
                    warn!(
                        status = status.as_u16(),
                        attempt = attempt,
                        "Server error, retrying after backoff"
                    );
                }
                Err(e) => {
                    if attempt >= max_retries {
                        break RequestOutcome::failed(
                            data_class,
                            format!("{e} after {max_retries} retries"),
                        );
                    }
                    debug!(error = %e, attempt = attempt, "Transport error, retrying");
                }
            }

            attempt += 1;
            tokio::time::sleep(calculate_backoff(attempt)).await;
        };

        let elapsed = started.elapsed();
        if let Ok(mut inner) = stats.lock() {
            inner.completed += 1;
            inner.total_time += elapsed;
        }

        outcome
    }
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn stream_requests(
        &self,
        requests: Box<dyn Iterator<Item = TrackingRequest> + Send>,
        limit: u64,
    ) -> Result<OutcomeStream, DispatchError> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let max_retries = self.max_retries;
        let request_delay = self.request_delay;
        let stats = Arc::clone(&self.stats);

        let stream = futures_util::stream::iter(requests.take(limit as usize))
            .map(move |request| {
                Self::send_one(
                    client.clone(),
                    endpoint.clone(),
                    request,
                    max_retries,
                    request_delay,
                    Arc::clone(&stats),
                )
            })
            .buffer_unordered(self.concurrency);

        Ok(Box::pin(stream))
    }

    fn stats(&self) -> DispatcherStats {
        let inner = match self.stats.lock() {
            Ok(inner) => inner,
            Err(_) => return DispatcherStats::default(),
        };

        let avg_time_ms = if inner.completed > 0 {
            inner.total_time.as_secs_f64() * 1000.0 / inner.completed as f64
        } else {
            0.0
        };
        let elapsed = inner.started.elapsed().as_secs_f64();
        let requests_per_second = if elapsed > 0.0 {
            inner.completed as f64 / elapsed
        } else {
            0.0
        };

        DispatcherStats {
            requests_sent: inner.completed,
            avg_time_ms,
            requests_per_second,
        }
    }
}
