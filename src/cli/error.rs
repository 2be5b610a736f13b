//! CLI error types and conversions

use crate::identifier::IdentifierError;
use crate::orchestrator::SimulatorError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Identifier error
    #[error("identifier error: {0}")]
    IdentifierError(#[from] IdentifierError),

    /// Simulation run error
    #[error("simulation error: {0}")]
    SimulatorError(#[from] SimulatorError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Filesystem error
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
