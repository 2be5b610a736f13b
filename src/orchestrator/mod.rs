//! Run orchestration
//!
//! Drives a complete simulation run through a strict phase sequence:
//!
//! 1. **Setup**: verify/repair target settings, build the dispatcher,
//!    construct the adversarial generators the configured ratios require
//! 2. **Provision**: ensure trackable content and users exist
//! 3. **CheckpointInit**: load or create the run's checkpoint, gated on the
//!    configuration fingerprint
//! 4. **Execute**: stream the remaining requests through the dispatcher,
//!    accounting every outcome and checkpointing at the save interval
//! 5. **Finalize**: mark the checkpoint completed, optionally restore
//!    settings, emit the final summary
//!
//! A cooperative stop (Ctrl+C) exits between outcomes with a `paused`
//! checkpoint and a normal return; every other mid-run failure marks the
//! checkpoint `failed` and propagates.
//!
//! # Error Handling
//!
//! Per-item outcomes are data, never errors: individual request failures are
//! expected load-test signal and only surface in aggregate counters. Fatal
//! errors (settings, provisioning, dispatcher construction, early stream
//! termination) abort the run.

pub mod config;
pub mod progress;
pub mod runner;

pub use progress::ProgressSnapshot;
pub use runner::{RunOrchestrator, RunSummary};

use crate::dispatcher::DispatchError;
use crate::provision::ProvisionError;

/// Fatal orchestration errors
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// Configuration failed validation
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Target-system settings are wrong and could not be repaired
    #[error("settings error: {0}")]
    SettingsError(String),

    /// Provisioning call failed
    #[error("provisioning error: {0}")]
    ProvisionError(#[from] ProvisionError),

    /// No trackable resources exist to attribute synthetic visits to
    #[error("no trackable resources available on the target")]
    NoResources,

    /// Dispatcher could not be constructed or started
    #[error("dispatch error: {0}")]
    DispatchError(#[from] DispatchError),

    /// The outcome stream ended before the remaining target was reached
    #[error("dispatcher stream ended after {received} of {expected} outcomes")]
    StreamEndedEarly {
        /// Outcomes received this attempt
        received: u64,
        /// Outcomes expected this attempt
        expected: u64,
    },
}
