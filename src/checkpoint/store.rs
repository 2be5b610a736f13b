//! Per-run checkpoint handle with throttled persistence
//!
//! A `CheckpointStore` owns the state for one identifier for the lifetime of
//! one process. Counter updates are pure in-memory; actual disk writes are
//! throttled to the configured save interval so the hot loop is not bound by
//! fsync latency. Lifecycle transitions save immediately.
//!
//! Single-writer-per-identifier is assumed; running two processes against the
//! same identifier concurrently is the caller's bug to prevent.

use super::ops::checkpoint_file_name;
use super::state::{CheckpointState, CheckpointStatus};
use crate::config::RunConfiguration;
use crate::identifier::RunIdentifier;
use crate::{DataClass, RequestStatus};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Floor on the save interval, to bound write amplification on large runs.
pub const MIN_SAVE_INTERVAL: u64 = 100;

/// Durable counter store for one run identifier.
pub struct CheckpointStore {
    path: PathBuf,
    state: CheckpointState,
    enabled: bool,
    save_interval: u64,
    unsaved: u64,
    resumed: bool,
    last_accrual: Instant,
}

impl CheckpointStore {
    /// Load or create the checkpoint for `identifier` and begin an attempt.
    ///
    /// Reconciles the configuration fingerprint: a mismatch discards the
    /// stored counters (the attempt history survives) and the run restarts
    /// from zero under the same identifier. Unreadable or completed documents
    /// also yield a fresh state. Ends with an immediate save.
    pub fn initialize(dir: &Path, identifier: &RunIdentifier, config: &RunConfiguration) -> Self {
        let path = dir.join(checkpoint_file_name(identifier.as_str()));
        let fingerprint = config.fingerprint();
        let seed_offset = config.seed.unwrap_or(0);
        let enabled = config.checkpoints_enabled;

        let mut resumed = false;
        let mut state = if enabled && path.exists() {
            match CheckpointState::load(&path) {
                Ok(mut state) => {
                    if state.config_hash() != fingerprint {
                        state.reset_counters(fingerprint, config.target, seed_offset);
                    } else if state.processed() > 0 {
                        info!(
                            identifier = %identifier,
                            processed = state.processed(),
                            target_records = state.target(),
                            "Resuming prior run"
                        );
                        resumed = true;
                    }
                    state
                }
                Err(e) => {
                    info!(
                        identifier = %identifier,
                        reason = %e,
                        "Checkpoint not resumable; starting fresh"
                    );
                    CheckpointState::new(
                        identifier.as_str().to_string(),
                        fingerprint,
                        config.target,
                        seed_offset,
                    )
                }
            }
        } else {
            CheckpointState::new(
                identifier.as_str().to_string(),
                fingerprint,
                config.target,
                seed_offset,
            )
        };

        state.begin_attempt(resumed);

        let mut store = Self {
            path,
            state,
            enabled,
            save_interval: config.checkpoint_interval.max(MIN_SAVE_INTERVAL),
            unsaved: 0,
            resumed,
            last_accrual: Instant::now(),
        };
        store.save();
        store
    }

    /// Whether this store resumed prior progress.
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    /// Records still needed to reach the target.
    pub fn remaining(&self) -> u64 {
        self.state.target().saturating_sub(self.state.processed())
    }

    /// Current state snapshot.
    pub fn state(&self) -> &CheckpointState {
        &self.state
    }

    /// Checkpoint file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one dispatched outcome.
    ///
    /// Pure in-memory counter update plus elapsed-time accrual; triggers a
    /// disk write once `save_interval` records have accumulated.
    pub fn record_processed(&mut self, status: RequestStatus, data_class: DataClass) {
        self.accrue_elapsed();
        self.state.apply_outcome(status, data_class);
        self.unsaved += 1;
        if self.unsaved >= self.save_interval {
            self.save();
        }
    }

    /// Serialize and write the document now. Returns whether the write
    /// succeeded; failures are logged and degrade rather than propagate.
    pub fn save(&mut self) -> bool {
        if !self.enabled {
            self.unsaved = 0;
            return true;
        }
        match self.state.save(&self.path) {
            Ok(()) => {
                self.unsaved = 0;
                true
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Checkpoint save failed");
                false
            }
        }
    }

    /// Mark the run completed and save immediately.
    pub fn mark_complete(&mut self) {
        self.accrue_elapsed();
        self.state.complete();
        self.save();
    }

    /// Mark the run failed with the error text and save immediately.
    pub fn mark_failed(&mut self, error: &str) {
        self.accrue_elapsed();
        self.state.fail(error);
        self.save();
    }

    /// Mark the run paused and save immediately.
    pub fn pause(&mut self) {
        self.accrue_elapsed();
        self.state.pause();
        self.save();
    }

    /// Whether the run has reached a terminal or suspended status.
    pub fn is_settled(&self) -> bool {
        self.state.status() != CheckpointStatus::Running
    }

    fn accrue_elapsed(&mut self) {
        let elapsed = self.last_accrual.elapsed();
        self.last_accrual = Instant::now();
        self.state.accrue_elapsed(elapsed.as_secs_f64());
    }
}
