//! Checkpoint document and atomic persistence
//!
//! The document is written whole on every save via a `<file>.tmp` staging
//! path and an atomic rename, so a crash mid-write (or a concurrent reader)
//! never observes a partially written checkpoint. This atomicity is the
//! central correctness property of the subsystem.

use super::CheckpointError;
use crate::{DataClass, RequestStatus};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Current checkpoint document schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Maximum allowed checkpoint file size (10 MB) to prevent memory exhaustion
pub const MAX_STATE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Lifecycle status of a checkpointed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Run is (or was, at last save) in progress
    Running,
    /// Run was suspended via the cooperative stop path; resumable
    Paused,
    /// Run reached its target; never resumed
    Completed,
    /// Run aborted on a fatal error; inspectable, and the loader does not
    /// forbid resuming it (only `Completed` is hard-blocked)
    Failed,
}

impl CheckpointStatus {
    /// Lowercase label used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One process invocation's contribution to a checkpoint's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAttempt {
    /// Attempt start time (Unix milliseconds)
    pub started_at: i64,
    /// Cumulative processed count when the attempt began
    pub processed_start: u64,
    /// Whether this attempt resumed prior progress
    pub resumed: bool,
    /// Attempt end time, set on completion/pause/failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    /// Cumulative processed count when the attempt ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_end: Option<u64>,
    /// Error text when the attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Durable run state for one identifier.
///
/// Counters are cumulative across resumes and monotonically non-decreasing
/// for the lifetime of the identifier. `processed` always equals
/// `successful + failed + rejected`; the mutators maintain this by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    version: String,
    #[serde(default)]
    identifier: String,
    status: CheckpointStatus,
    #[serde(default)]
    config_hash: String,
    processed: u64,
    #[serde(default)]
    successful: u64,
    #[serde(default)]
    failed: u64,
    #[serde(default)]
    rejected: u64,
    #[serde(default)]
    invalid_data_count: u64,
    #[serde(default)]
    attack_data_count: u64,
    target: u64,
    #[serde(default)]
    seed_offset: u64,
    #[serde(default)]
    elapsed_seconds: f64,
    #[serde(default)]
    runs: Vec<RunAttempt>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
}

impl CheckpointState {
    /// Create a fresh state for an identifier.
    pub fn new(identifier: String, config_hash: String, target: u64, seed_offset: u64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            version: SCHEMA_VERSION.to_string(),
            identifier,
            status: CheckpointStatus::Running,
            config_hash,
            processed: 0,
            successful: 0,
            failed: 0,
            rejected: 0,
            invalid_data_count: 0,
            attack_data_count: 0,
            target,
            seed_offset,
            elapsed_seconds: 0.0,
            runs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Get the lifecycle status.
    pub fn status(&self) -> CheckpointStatus {
        self.status
    }

    /// Get the stored configuration fingerprint.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Cumulative processed count.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Cumulative successful count.
    pub fn successful(&self) -> u64 {
        self.successful
    }

    /// Cumulative failed count.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Cumulative rejected count.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Requests sent from the invalid generator, independent of outcome.
    pub fn invalid_data_count(&self) -> u64 {
        self.invalid_data_count
    }

    /// Requests sent from the attack generator, independent of outcome.
    pub fn attack_data_count(&self) -> u64 {
        self.attack_data_count
    }

    /// Original record target for this identifier.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Generator seed checkpoint (forward compatibility; current generators
    /// are stateless per call).
    pub fn seed_offset(&self) -> u64 {
        self.seed_offset
    }

    /// Cumulative wall-clock processing time across all resumes.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Attempt history, one entry per process invocation.
    pub fn runs(&self) -> &[RunAttempt] {
        &self.runs
    }

    /// Last update time (Unix milliseconds).
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Apply one dispatched outcome to the counters.
    pub fn apply_outcome(&mut self, status: RequestStatus, data_class: DataClass) {
        self.processed += 1;
        match status {
            RequestStatus::Success => self.successful += 1,
            RequestStatus::Rejected => self.rejected += 1,
            RequestStatus::Failed => self.failed += 1,
        }
        match data_class {
            DataClass::Invalid => self.invalid_data_count += 1,
            DataClass::Attack => self.attack_data_count += 1,
            DataClass::Normal => {}
        }
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    /// Accrue wall-clock processing time.
    pub fn accrue_elapsed(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.elapsed_seconds += seconds;
        }
    }

    /// Start a new attempt against this identifier.
    pub fn begin_attempt(&mut self, resumed: bool) {
        debug!(
            identifier = %self.identifier,
            processed = self.processed,
            resumed = resumed,
            attempt = self.runs.len() + 1,
            "Beginning run attempt"
        );
        self.runs.push(RunAttempt {
            started_at: chrono::Utc::now().timestamp_millis(),
            processed_start: self.processed,
            resumed,
            ended_at: None,
            processed_end: None,
            error: None,
        });
        self.status = CheckpointStatus::Running;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    /// Discard counters after a configuration-fingerprint mismatch.
    ///
    /// The attempt history is retained; only progress is reset. This is the
    /// safety valve against resuming under incompatible parameters.
    pub fn reset_counters(&mut self, config_hash: String, target: u64, seed_offset: u64) {
        info!(
            identifier = %self.identifier,
            discarded_processed = self.processed,
            "Configuration changed; discarding checkpoint counters"
        );
        self.config_hash = config_hash;
        self.target = target;
        self.seed_offset = seed_offset;
        self.processed = 0;
        self.successful = 0;
        self.failed = 0;
        self.rejected = 0;
        self.invalid_data_count = 0;
        self.attack_data_count = 0;
        self.elapsed_seconds = 0.0;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    fn close_attempt(&mut self, error: Option<String>) {
        let processed = self.processed;
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(attempt) = self.runs.last_mut() {
            attempt.ended_at = Some(now);
            attempt.processed_end = Some(processed);
            attempt.error = error;
        }
        self.updated_at = now;
    }

    /// Terminal transition: the run reached its target.
    pub fn complete(&mut self) {
        self.status = CheckpointStatus::Completed;
        self.close_attempt(None);
    }

    /// Terminal transition: the run aborted with an error.
    pub fn fail(&mut self, error: &str) {
        self.status = CheckpointStatus::Failed;
        self.close_attempt(Some(error.to_string()));
    }

    /// Suspend transition: the run was stopped cooperatively.
    pub fn pause(&mut self) {
        self.status = CheckpointStatus::Paused;
        self.close_attempt(None);
    }

    /// Save the document atomically.
    ///
    /// Serializes the whole document, writes it to a `<file>.tmp` staging
    /// path, fsyncs, and renames into place. An advisory `.lock` file
    /// coordinates with concurrent readers of the same document.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        debug!(
            path = %path.display(),
            processed = self.processed,
            status = self.status.as_str(),
            "Saving checkpoint"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CheckpointError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationError(e.to_string()))?;

        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CheckpointError::LockError(format!("Failed to create lock file: {e}")))?;

        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| CheckpointError::LockError(format!("Failed to acquire write lock: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut tmp_file = std::fs::File::create(&tmp_path)
                .map_err(|e| CheckpointError::IoError(format!("Failed to create temp file: {e}")))?;
            tmp_file
                .write_all(json.as_bytes())
                .map_err(|e| CheckpointError::IoError(format!("Failed to write temp file: {e}")))?;
            tmp_file
                .flush()
                .map_err(|e| CheckpointError::IoError(format!("Failed to flush temp file: {e}")))?;
            // Sync to disk before the rename so the staged bytes are durable
            tmp_file
                .sync_all()
                .map_err(|e| CheckpointError::IoError(format!("Failed to sync temp file: {e}")))?;
        }

        std::fs::rename(&tmp_path, path)
            .map_err(|e| CheckpointError::IoError(format!("Failed to rename temp file: {e}")))?;

        // Fsync parent directory so the rename itself is durable
        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    /// Load a document from disk.
    ///
    /// Rejects oversized, unparsable, or version-incompatible documents, and
    /// documents whose status is `completed` — a completed checkpoint is
    /// never resumed, regardless of its other contents.
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        debug!(path = %path.display(), "Loading checkpoint");

        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CheckpointError::LockError(format!("Failed to create lock file: {e}")))?;

        let lock = RwLock::new(lock_file);
        let _guard = lock
            .read()
            .map_err(|e| CheckpointError::LockError(format!("Failed to acquire read lock: {e}")))?;

        let metadata =
            std::fs::metadata(path).map_err(|e| CheckpointError::IoError(e.to_string()))?;
        if metadata.len() > MAX_STATE_FILE_SIZE {
            return Err(CheckpointError::StateTooLarge {
                size: metadata.len(),
                max: MAX_STATE_FILE_SIZE,
            });
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| CheckpointError::IoError(e.to_string()))?;

        let state: CheckpointState = serde_json::from_str(&contents).map_err(|e| {
            warn!(error = %e, "Failed to deserialize checkpoint");
            CheckpointError::DeserializationError(e.to_string())
        })?;

        if state.version != SCHEMA_VERSION {
            warn!(
                found_version = %state.version,
                expected_version = SCHEMA_VERSION,
                "Checkpoint schema version mismatch"
            );
            return Err(CheckpointError::VersionMismatch {
                expected: SCHEMA_VERSION.to_string(),
                found: state.version.clone(),
            });
        }

        if state.status == CheckpointStatus::Completed {
            info!(
                identifier = %state.identifier,
                processed = state.processed,
                "Checkpoint is completed; refusing resume"
            );
            return Err(CheckpointError::Completed);
        }

        info!(
            identifier = %state.identifier,
            processed = state.processed,
            target_records = state.target,
            attempts = state.runs.len(),
            "Checkpoint loaded"
        );

        Ok(state)
    }
}
