//! Durable run state with atomic persistence
//!
//! One checkpoint document per run identifier captures cumulative counters,
//! the resume-compatibility fingerprint, and per-attempt history, so an
//! interrupted run can pick up where it left off without re-sending completed
//! work.
//!
//! # Components
//!
//! - [`state::CheckpointState`] - The persisted document and its atomic
//!   save/load
//! - [`store::CheckpointStore`] - Per-run handle with throttled writes and
//!   lifecycle transitions
//! - [`ops`] - Directory-wide `exists`/`list`/`cleanup` free functions
//!
//! # Error Handling
//!
//! Checkpoint I/O never aborts a run. Load failures fall back to a fresh
//! state; save failures degrade to a logged `false`. Losing a checkpoint
//! write means "start over at worst," not "crash a multi-hour run."

pub mod ops;
pub mod state;
pub mod store;

pub use ops::{cleanup, exists, list, CheckpointSummary};
pub use state::{CheckpointState, CheckpointStatus, RunAttempt};
pub use store::CheckpointStore;

/// Errors related to checkpoint persistence
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Document schema version mismatch
    #[error("schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version
        expected: String,
        /// Found schema version
        found: String,
    },

    /// Document exceeds the size cap
    #[error("checkpoint file too large: {size} bytes (max: {max} bytes)")]
    StateTooLarge {
        /// Actual file size
        size: u64,
        /// Maximum allowed size
        max: u64,
    },

    /// Document belongs to a completed run and must not be resumed
    #[error("checkpoint is completed and cannot be resumed")]
    Completed,

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Lock error
    #[error("lock error: {0}")]
    LockError(String),
}
