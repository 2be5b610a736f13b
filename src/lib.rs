//! # Analytics Traffic Simulator Library
//!
//! A load- and security-testing traffic simulator for analytics ingestion
//! endpoints. Generates large volumes of synthetic tracking requests (normal,
//! malformed, and adversarial), streams them through a concurrent HTTP
//! dispatcher, and checkpoints cumulative progress so a multi-hour run can be
//! paused, interrupted, or crashed and resumed without re-sending completed
//! work or misreporting totals.
//!
//! ## Features
//!
//! - **Resumable runs**: Crash-safe checkpoint documents with atomic writes
//!   and a configuration fingerprint gate on resume
//! - **Weighted traffic mix**: Per-request classification into normal,
//!   invalid, and attack payloads from configured ratios
//! - **Lazy streaming**: Requests are produced on demand, never materialized,
//!   so targets in the millions stay memory-flat
//! - **Concurrent dispatch**: Bounded fan-out with per-request timeouts and
//!   bounded retries inside the dispatcher
//! - **Live progress**: Percent-complete, success rate, throughput, and ETA
//!   derived from cumulative counters
//!
//! ## Quick Start
//!
//! ```no_run
//! use analytics_traffic_simulator::config::RunConfiguration;
//! use analytics_traffic_simulator::orchestrator::RunOrchestrator;
//! use analytics_traffic_simulator::provision::{NoopSettings, StaticProvisioner, Resource};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfiguration {
//!     endpoint: "http://localhost:8080/track".to_string(),
//!     target: 10_000,
//!     ..RunConfiguration::default()
//! };
//!
//! let provisioner = Arc::new(StaticProvisioner::new(vec![Resource::new(
//!     1,
//!     "http://localhost:8080/sample-page/",
//!     "Sample Page",
//! )]));
//!
//! let summary = RunOrchestrator::new(config, provisioner, Arc::new(NoopSettings))
//!     .run()
//!     .await?;
//! println!("processed {} requests", summary.processed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Run configuration and resume-compatibility fingerprint
//! - [`identifier`] - Run-name sanitization for checkpoint file naming
//! - [`selector`] - Weighted request-type classification
//! - [`generator`] - Normal/invalid/attack payload generators
//! - [`stream`] - Lazy unbounded request stream
//! - [`dispatcher`] - Concurrent HTTP submission engine contract and impl
//! - [`provision`] - Content/user provisioning and target-settings contracts
//! - [`checkpoint`] - Durable run state with load/save/list/cleanup
//! - [`orchestrator`] - Phase state machine driving a complete run
//! - [`stop`] - Cooperative stop/pause coordination
//! - [`metrics`] - Prometheus observability

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Durable run state with atomic persistence
pub mod checkpoint;

/// CLI command implementations
pub mod cli;

/// Run configuration and resume fingerprint
pub mod config;

/// Concurrent HTTP dispatcher contract and implementation
pub mod dispatcher;

/// Payload generators for each data class
pub mod generator;

/// Run identifier sanitization
pub mod identifier;

/// Prometheus metrics helpers
pub mod metrics;

/// Run orchestration phase machine
pub mod orchestrator;

/// Content/user provisioning and target-settings contracts
pub mod provision;

/// Weighted request-type selection
pub mod selector;

/// Cooperative stop coordination shared across modules
pub mod stop;

/// Lazy request stream production
pub mod stream;

// Re-export commonly used types
pub use config::RunConfiguration;
pub use orchestrator::{RunOrchestrator, RunSummary};

/// Classification of a synthetic request's payload.
///
/// Carried alongside each request and its outcome so the orchestrator can
/// attribute results without re-deriving the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataClass {
    /// A plausible, well-formed tracking hit
    Normal,
    /// A malformed payload (missing/garbled fields)
    Invalid,
    /// An adversarial payload (injection attempts, oversize fields)
    Attack,
}

impl DataClass {
    /// Lowercase label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Invalid => "invalid",
            Self::Attack => "attack",
        }
    }
}

impl std::fmt::Display for DataClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of one dispatched request.
///
/// Per-item failures are load-test signal, not errors; the orchestrator
/// aggregates them into counters and never aborts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// The endpoint accepted the request (HTTP 2xx)
    Success,
    /// The endpoint actively rejected the request (HTTP 4xx)
    Rejected,
    /// Transport failure or server error after retries were exhausted
    Failed,
}

impl RequestStatus {
    /// Lowercase label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// One synthetic tracking request ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRequest {
    /// Form fields posted to the ingestion endpoint
    pub fields: Vec<(String, String)>,
    /// Which generator produced this payload
    pub data_class: DataClass,
}

impl TrackingRequest {
    /// Create a request from form fields and a data class.
    pub fn new(fields: Vec<(String, String)>, data_class: DataClass) -> Self {
        Self { fields, data_class }
    }

    /// Look up a form field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// How the endpoint (or transport) resolved the request
    pub status: RequestStatus,
    /// Data class carried over from the originating request
    pub data_class: DataClass,
    /// Transport or server error text, when `status` is `Failed`
    pub error: Option<String>,
}

impl RequestOutcome {
    /// Build a success outcome for a request of the given class.
    pub fn success(data_class: DataClass) -> Self {
        Self {
            status: RequestStatus::Success,
            data_class,
            error: None,
        }
    }

    /// Build a rejected outcome for a request of the given class.
    pub fn rejected(data_class: DataClass) -> Self {
        Self {
            status: RequestStatus::Rejected,
            data_class,
            error: None,
        }
    }

    /// Build a failed outcome carrying the error text.
    pub fn failed(data_class: DataClass, error: impl Into<String>) -> Self {
        Self {
            status: RequestStatus::Failed,
            data_class,
            error: Some(error.into()),
        }
    }
}
