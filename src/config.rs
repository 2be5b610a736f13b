//! Run configuration and resume-compatibility fingerprint

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent in-flight requests.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default per-request retry budget inside the dispatcher.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default checkpoint save interval (records between disk writes).
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 500;

/// Configuration for one simulator invocation.
///
/// Ephemeral: only its [`fingerprint`](RunConfiguration::fingerprint) is
/// persisted, as the resume-compatibility gate on the checkpoint document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    /// Ingestion endpoint URL the dispatcher posts to
    pub endpoint: String,
    /// Total record count this run drives toward
    pub target: u64,
    /// Concurrent in-flight request width inside the dispatcher
    pub concurrency: usize,
    /// Optional delay applied before each request
    pub request_delay: Duration,
    /// Per-request retry budget for transient failures
    pub max_retries: u32,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Full request timeout
    pub request_timeout: Duration,
    /// Fraction of requests drawn from the invalid-payload generator
    pub invalid_ratio: f64,
    /// Fraction of requests drawn from the attack-payload generator
    pub attack_ratio: f64,
    /// Fraction of normal requests simulated as logged-in visitors
    pub logged_in_ratio: f64,
    /// Start of the simulated visit date window (inclusive)
    pub date_from: NaiveDate,
    /// End of the simulated visit date window (inclusive)
    pub date_to: NaiveDate,
    /// Records between throttled checkpoint writes
    pub checkpoint_interval: u64,
    /// Apply target-system settings needed for the tracker during Setup
    pub auto_configure_settings: bool,
    /// Restore pre-run settings during Finalize
    pub restore_settings: bool,
    /// Persist checkpoints to disk (counters are tracked either way)
    pub checkpoints_enabled: bool,
    /// Explicit run name; a timestamp-based default is derived when absent
    pub run_name: Option<String>,
    /// Directory holding checkpoint documents
    pub checkpoint_dir: PathBuf,
    /// Optional RNG seed for reproducible traffic
    pub seed: Option<u64>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            endpoint: String::new(),
            target: 1000,
            concurrency: DEFAULT_CONCURRENCY,
            request_delay: Duration::ZERO,
            max_retries: DEFAULT_MAX_RETRIES,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            invalid_ratio: 0.0,
            attack_ratio: 0.0,
            logged_in_ratio: 0.0,
            date_from: today - chrono::Days::new(30),
            date_to: today,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            auto_configure_settings: true,
            restore_settings: false,
            checkpoints_enabled: true,
            run_name: None,
            checkpoint_dir: PathBuf::from("./checkpoints"),
            seed: None,
        }
    }
}

impl RunConfiguration {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("Endpoint URL cannot be empty".to_string());
        }

        if self.target == 0 {
            return Err("Target must be greater than zero".to_string());
        }

        if self.concurrency == 0 {
            return Err("Concurrency must be greater than zero".to_string());
        }

        for (name, ratio) in [
            ("invalid_ratio", self.invalid_ratio),
            ("attack_ratio", self.attack_ratio),
            ("logged_in_ratio", self.logged_in_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(format!("{name} must be within [0, 1], got {ratio}"));
            }
        }

        if self.date_to < self.date_from {
            return Err(format!(
                "Date window end ({}) must not precede start ({})",
                self.date_to, self.date_from
            ));
        }

        Ok(())
    }

    /// Fingerprint of the configuration subset that affects resume
    /// correctness.
    ///
    /// A checkpoint may only be resumed when the stored fingerprint matches
    /// the current one; everything else (concurrency, timeouts, delays) can
    /// change freely between attempts.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.target.to_le_bytes());
        hasher.update(self.invalid_ratio.to_le_bytes());
        hasher.update(self.attack_ratio.to_le_bytes());
        hasher.update(self.logged_in_ratio.to_le_bytes());
        hasher.update(self.date_from.to_string().as_bytes());
        hasher.update(self.date_to.to_string().as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}
