//! Progress, rate, and ETA reporting
//!
//! Pure functions of the cumulative counters maintained by the orchestrator
//! and checkpoint; no side effects, no stored state. Rate and ETA are
//! withheld below a minimum sample (100 processed, 1 second elapsed) so tiny
//! samples never produce wild estimates.

use std::time::Duration;

/// Minimum processed count before a rate is reported.
const MIN_RATE_SAMPLE: u64 = 100;

/// Snapshot of run progress derived from counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Cumulative processed count
    pub processed: u64,
    /// Record target
    pub target: u64,
    /// Percent complete, rounded to two decimals and capped at 100
    pub percent: f64,
    /// Fraction of processed requests that succeeded
    pub success_rate: f64,
    /// Requests per second, when the sample is large enough
    pub rate: Option<f64>,
    /// Estimated time remaining, when a rate is available
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    /// Derive a snapshot from cumulative counters.
    pub fn from_counters(
        processed: u64,
        successful: u64,
        target: u64,
        elapsed_seconds: f64,
    ) -> Self {
        let percent = if target == 0 {
            100.0
        } else {
            let raw = processed as f64 / target as f64 * 100.0;
            ((raw * 100.0).round() / 100.0).min(100.0)
        };

        let success_rate = if processed == 0 {
            0.0
        } else {
            successful as f64 / processed as f64
        };

        let rate = if processed < MIN_RATE_SAMPLE || elapsed_seconds < 1.0 {
            None
        } else {
            Some(processed as f64 / elapsed_seconds)
        };

        let eta = rate.and_then(|rate| {
            if rate <= 0.0 {
                return None;
            }
            let remaining = target.saturating_sub(processed);
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        });

        Self {
            processed,
            target,
            percent,
            success_rate,
            rate,
            eta,
        }
    }

    /// Human-readable progress string for logging.
    pub fn format_progress(&self) -> String {
        let mut parts = vec![format!(
            "[PROGRESS] {}/{} requests - {:.1}% complete",
            self.processed, self.target, self.percent
        )];

        parts.push(format!("({:.1}% ok)", self.success_rate * 100.0));

        if let Some(rate) = self.rate {
            parts.push(format!("at {rate:.0} req/sec"));
        }

        if let Some(eta) = self.eta {
            parts.push(format!("- ~{} remaining", format_duration(eta)));
        }

        parts.join(" ")
    }
}

/// Compact duration rendering for progress lines.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}
