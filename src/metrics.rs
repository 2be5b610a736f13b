//! Production observability metrics for the traffic simulator
//!
//! ## Architecture
//!
//! - Uses the `metrics` crate for low-overhead metric collection
//! - Prometheus exporter for a scraping endpoint
//! - Graceful degradation: recording into an uninitialized registry is a
//!   no-op, so library consumers pay nothing unless they opt in

use crate::{DataClass, RequestStatus};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info};

static METRICS_INITIALIZED: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

/// Initialize the metrics system with a Prometheus exporter.
///
/// Call once at application startup; idempotent.
///
/// # Arguments
/// * `addr` - Socket address for the Prometheus scrape endpoint
///   (e.g., "0.0.0.0:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "sim_requests_total",
        Unit::Count,
        "Total synthetic requests dispatched, by data class and outcome"
    );

    describe_counter!(
        "sim_runs_completed_total",
        Unit::Count,
        "Total simulation runs that reached their target"
    );

    describe_counter!(
        "sim_runs_failed_total",
        Unit::Count,
        "Total simulation runs aborted on a fatal error"
    );

    describe_histogram!(
        "sim_run_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of one run invocation"
    );

    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Whether the metrics system has been initialized.
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.load(Ordering::SeqCst)
}

/// Record one dispatched request outcome.
pub fn record_request(status: RequestStatus, data_class: DataClass) {
    counter!(
        "sim_requests_total",
        "class" => data_class.as_str(),
        "status" => status.as_str(),
    )
    .increment(1);
}

/// Run-level metrics helper.
pub struct RunMetrics {
    target: u64,
    start_time: Instant,
}

impl RunMetrics {
    /// Start tracking a run invocation.
    pub fn start(target: u64) -> Self {
        info!(target_records = target, "Simulation run started");
        Self {
            target,
            start_time: Instant::now(),
        }
    }

    /// Record a run that reached its target.
    pub fn record_success(&self, processed: u64) {
        let duration = self.start_time.elapsed();
        counter!("sim_runs_completed_total").increment(1);
        histogram!("sim_run_duration_seconds").record(duration.as_secs_f64());

        info!(
            target_records = self.target,
            processed = processed,
            duration_secs = duration.as_secs(),
            "Simulation run completed successfully"
        );
    }

    /// Record a run aborted on a fatal error.
    pub fn record_failure(&self, error: &str) {
        let duration = self.start_time.elapsed();
        counter!("sim_runs_failed_total").increment(1);

        error!(
            target_records = self.target,
            error = %error,
            duration_secs = duration.as_secs(),
            "Simulation run failed"
        );
    }
}
