//! CLI command implementations

pub mod checkpoints;
pub mod error;
pub mod run;

pub use checkpoints::CheckpointsCommand;
pub use error::CliError;
pub use run::{Cli, Commands, RunArgs};
