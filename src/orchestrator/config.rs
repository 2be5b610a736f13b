//! Orchestration constants and cadence helpers

use std::time::Duration;

/// Initial retry backoff delay in milliseconds.
/// 1 second is long enough for a transient blip to clear without stalling
/// recovery on a busy endpoint.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum retry backoff delay in milliseconds.
/// Caps exponential growth so a flapping endpoint never parks a worker for
/// more than 30 seconds per attempt.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Minimum items between progress log emissions.
pub const MIN_PROGRESS_CADENCE: u64 = 100;

/// Maximum items between progress log emissions.
pub const MAX_PROGRESS_CADENCE: u64 = 1000;

/// Calculate exponential backoff delay for a retry attempt.
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS * 2u64.pow(retry_count.min(16));
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}

/// Items between progress snapshots: roughly one percent of the target,
/// clamped to [100, 1000].
pub fn progress_cadence(target: u64) -> u64 {
    (target / 100).clamp(MIN_PROGRESS_CADENCE, MAX_PROGRESS_CADENCE)
}
