//! CLI commands for inspecting and maintaining checkpoint documents

use crate::checkpoint::ops;
use crate::identifier::RunIdentifier;
use clap::Args;
use std::time::Duration;

use super::run::{Cli, OutputFormat};
use super::CliError;

/// Default retention for completed checkpoints: one week.
const DEFAULT_MAX_AGE_HOURS: u64 = 168;

/// Checkpoints subcommand
#[derive(Debug, Args)]
pub struct CheckpointsCommand {
    #[command(subcommand)]
    action: CheckpointsAction,
}

/// Checkpoint actions
#[derive(Debug, clap::Subcommand)]
enum CheckpointsAction {
    /// List every checkpoint document, newest first
    List,

    /// Show the full document for one run
    Show {
        /// Run name (sanitized the same way the run command sanitizes it)
        name: String,
    },

    /// Delete completed checkpoints older than the retention window
    Cleanup {
        /// Retention window in hours
        #[arg(long, default_value_t = DEFAULT_MAX_AGE_HOURS)]
        max_age_hours: u64,
    },
}

impl CheckpointsCommand {
    /// Execute the checkpoints command.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        match &self.action {
            CheckpointsAction::List => self.execute_list(cli),
            CheckpointsAction::Show { name } => self.execute_show(cli, name),
            CheckpointsAction::Cleanup { max_age_hours } => {
                self.execute_cleanup(cli, *max_age_hours)
            }
        }
    }

    fn execute_list(&self, cli: &Cli) -> Result<(), CliError> {
        let summaries = ops::list(&cli.checkpoint_dir);

        match cli.output_format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summaries)
                        .map_err(|e| CliError::InvalidArgument(e.to_string()))?
                );
            }
            OutputFormat::Human => {
                if summaries.is_empty() {
                    println!("No checkpoints in {}", cli.checkpoint_dir.display());
                    return Ok(());
                }
                println!("Found {} checkpoint(s):\n", summaries.len());
                for summary in summaries {
                    println!(
                        "{} | {} | {}/{} | {} attempt(s)",
                        summary.identifier,
                        summary.status,
                        summary.processed,
                        summary.target,
                        summary.attempts
                    );
                }
            }
        }
        Ok(())
    }

    fn execute_show(&self, cli: &Cli, name: &str) -> Result<(), CliError> {
        let identifier = RunIdentifier::new(name)?;
        let path = cli
            .checkpoint_dir
            .join(ops::checkpoint_file_name(identifier.as_str()));
        if !path.exists() {
            return Err(CliError::InvalidArgument(format!(
                "no checkpoint found for run '{}'",
                identifier.as_str()
            )));
        }

        // Raw document: the show surface must work on completed and
        // version-mismatched checkpoints that a resume load would refuse.
        let contents = std::fs::read_to_string(&path)?;
        let document: serde_json::Value = serde_json::from_str(&contents)
            .map_err(|e| CliError::InvalidArgument(format!("malformed checkpoint: {e}")))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&document)
                .map_err(|e| CliError::InvalidArgument(e.to_string()))?
        );
        Ok(())
    }

    fn execute_cleanup(&self, cli: &Cli, max_age_hours: u64) -> Result<(), CliError> {
        let max_age = Duration::from_secs(max_age_hours * 3600);
        let deleted = ops::cleanup(&cli.checkpoint_dir, max_age);

        match cli.output_format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            }
            OutputFormat::Human => {
                println!("Deleted {deleted} completed checkpoint(s)");
            }
        }
        Ok(())
    }
}
