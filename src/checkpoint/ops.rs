//! Directory-wide checkpoint operations
//!
//! Free functions taking the directory explicitly, so they are trivially
//! testable against a temp directory and carry no global state.

use super::state::{CheckpointState, CheckpointStatus};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Checkpoint file name for an already-sanitized identifier.
pub fn checkpoint_file_name(identifier: &str) -> String {
    format!("checkpoint_{identifier}.json")
}

/// Whether a checkpoint document exists for the identifier.
pub fn exists(dir: &Path, identifier: &str) -> bool {
    dir.join(checkpoint_file_name(identifier)).exists()
}

/// One row of [`list`] output.
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointSummary {
    /// Sanitized run identifier
    pub identifier: String,
    /// Lifecycle status at last save
    pub status: String,
    /// Cumulative processed count
    pub processed: u64,
    /// Record target
    pub target: u64,
    /// Number of attempts recorded
    pub attempts: usize,
    /// Last update time (Unix milliseconds)
    pub updated_at: i64,
}

/// Summarize every checkpoint document in the directory.
///
/// Unreadable documents are skipped with a warning rather than failing the
/// listing; completed documents are included (the listing is an inspection
/// surface, not a resume path).
pub fn list(dir: &Path) -> Vec<CheckpointSummary> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Checkpoint directory not readable");
            return Vec::new();
        }
    };

    let mut summaries = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("checkpoint_") || !name.ends_with(".json") {
            continue;
        }

        let contents = match std::fs::read_to_string(entry.path()) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping unreadable checkpoint");
                continue;
            }
        };
        let state: CheckpointState = match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping malformed checkpoint");
                continue;
            }
        };

        summaries.push(CheckpointSummary {
            identifier: state.identifier().to_string(),
            status: state.status().as_str().to_string(),
            processed: state.processed(),
            target: state.target(),
            attempts: state.runs().len(),
            updated_at: state.updated_at(),
        });
    }

    summaries.sort_by_key(|s| std::cmp::Reverse(s.updated_at));
    summaries
}

/// Delete completed checkpoints older than `max_age`.
///
/// Only `completed` documents are eligible; `running`, `paused`, and `failed`
/// ones are never touched, whatever their age. Returns the number deleted.
pub fn cleanup(dir: &Path, max_age: Duration) -> usize {
    let cutoff = chrono::Utc::now().timestamp_millis() - max_age.as_millis() as i64;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut deleted = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("checkpoint_") || !name.ends_with(".json") {
            continue;
        }

        let state: CheckpointState = match std::fs::read_to_string(entry.path())
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
        {
            Some(state) => state,
            None => continue,
        };

        if state.status() != CheckpointStatus::Completed || state.updated_at() >= cutoff {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                info!(
                    identifier = %state.identifier(),
                    "Removed expired completed checkpoint"
                );
                deleted += 1;
            }
            Err(e) => warn!(file = %name, error = %e, "Failed to remove checkpoint"),
        }
    }

    deleted
}
