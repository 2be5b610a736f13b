//! Run identifier sanitization and defaults
//!
//! A run identifier scopes one checkpoint document. Caller-supplied names are
//! sanitized to a filesystem-safe token; unnamed runs get a timestamp default.

use std::fmt;

/// A sanitized run identifier.
///
/// Any character outside `[A-Za-z0-9_-]` in the source name is mapped to `_`,
/// so the identifier can be embedded directly in a checkpoint file name.
///
/// # Examples
///
/// ```
/// use analytics_traffic_simulator::identifier::RunIdentifier;
///
/// let id = RunIdentifier::new("nightly load: 2026/08").unwrap();
/// assert_eq!(id.as_str(), "nightly_load__2026_08");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunIdentifier(String);

impl RunIdentifier {
    /// Sanitize a caller-supplied run name into an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: &str) -> Result<Self, IdentifierError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }

        let sanitized: String = trimmed
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Ok(Self(sanitized))
    }

    /// Timestamp-based default identifier for unnamed runs.
    pub fn timestamped() -> Self {
        Self(format!(
            "run_{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ))
    }

    /// The sanitized token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from identifier construction
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Name was empty or whitespace-only
    #[error("run name cannot be empty")]
    Empty,
}
