//! Run command implementation

use crate::config::{
    RunConfiguration, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES,
};
use crate::orchestrator::{RunOrchestrator, RunSummary};
use crate::provision::{NoopSettings, Resource, StaticProvisioner};
use crate::stop::SharedStop;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::CliError;

/// Maximum allowed concurrency so a misconfigured run cannot DoS the target
/// beyond what it was asked to simulate.
const MAX_CONCURRENCY: usize = 200;

/// Parse and validate a concurrency value.
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Parse a traffic-mix ratio, enforcing the [0, 1] range.
fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("ratio must be within [0, 1], got {value}"));
    }
    Ok(value)
}

/// Parse a date in YYYY-MM-DD format.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}': {e}"))
}

/// Output format options
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Analytics Traffic Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "analytics-traffic-simulator")]
#[command(about = "Generate synthetic tracking traffic against an analytics endpoint", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Checkpoint document directory
    #[arg(long, global = true, default_value = "./checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<std::net::SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a simulation run
    Run(RunArgs),

    /// Inspect and maintain checkpoint documents
    Checkpoints(super::CheckpointsCommand),
}

/// Run command arguments
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Ingestion endpoint URL to post tracking requests to
    #[arg(long)]
    pub endpoint: String,

    /// Total number of records to generate
    #[arg(long, default_value = "1000")]
    pub target: u64,

    /// Concurrent in-flight requests (max: 200)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Delay before each request, in milliseconds
    #[arg(long, default_value = "0")]
    pub request_delay_ms: u64,

    /// Per-request retry budget for transient failures
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// TCP connect timeout in seconds
    #[arg(long, default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Full request timeout in seconds
    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,

    /// Fraction of requests with malformed payloads (0.0 - 1.0)
    #[arg(long, default_value = "0.0", value_parser = parse_ratio)]
    pub invalid_ratio: f64,

    /// Fraction of requests with adversarial payloads (0.0 - 1.0)
    #[arg(long, default_value = "0.0", value_parser = parse_ratio)]
    pub attack_ratio: f64,

    /// Fraction of normal requests simulated as logged-in visitors (0.0 - 1.0)
    #[arg(long, default_value = "0.0", value_parser = parse_ratio)]
    pub logged_in_ratio: f64,

    /// Start of the simulated visit date window (YYYY-MM-DD, default: 30 days ago)
    #[arg(long, value_parser = parse_date)]
    pub date_from: Option<NaiveDate>,

    /// End of the simulated visit date window (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    pub date_to: Option<NaiveDate>,

    /// Records between throttled checkpoint writes
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    pub checkpoint_interval: u64,

    /// Named run; reusing the name resumes its checkpoint
    #[arg(long)]
    pub run_name: Option<String>,

    /// Disable checkpoint persistence for this run
    #[arg(long, default_value_t = false)]
    pub no_checkpoints: bool,

    /// Skip automatic target-settings repair during setup
    #[arg(long, default_value_t = false)]
    pub no_auto_configure: bool,

    /// Restore pre-run target settings when the run completes
    #[arg(long, default_value_t = false)]
    pub restore_settings: bool,

    /// RNG seed for reproducible traffic
    #[arg(long)]
    pub seed: Option<u64>,

    /// Trackable page URL on the target; repeat for multiple pages
    #[arg(long = "resource", required = true)]
    pub resources: Vec<String>,
}

impl RunArgs {
    fn to_configuration(&self, cli: &Cli) -> RunConfiguration {
        let defaults = RunConfiguration::default();
        RunConfiguration {
            endpoint: self.endpoint.clone(),
            target: self.target,
            concurrency: self.concurrency,
            request_delay: Duration::from_millis(self.request_delay_ms),
            max_retries: self.max_retries,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            invalid_ratio: self.invalid_ratio,
            attack_ratio: self.attack_ratio,
            logged_in_ratio: self.logged_in_ratio,
            date_from: self.date_from.unwrap_or(defaults.date_from),
            date_to: self.date_to.unwrap_or(defaults.date_to),
            checkpoint_interval: self.checkpoint_interval,
            auto_configure_settings: !self.no_auto_configure,
            restore_settings: self.restore_settings,
            checkpoints_enabled: !self.no_checkpoints,
            run_name: self.run_name.clone(),
            checkpoint_dir: cli.checkpoint_dir.clone(),
            seed: self.seed,
        }
    }

    /// Execute the run command.
    pub async fn execute(&self, cli: &Cli, stop: SharedStop) -> Result<(), CliError> {
        let config = self.to_configuration(cli);
        config.validate().map_err(CliError::InvalidArgument)?;

        let resources: Vec<Resource> = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let title = url
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("page")
                    .to_string();
                Resource::new(i as u64 + 1, url.clone(), title)
            })
            .collect();

        info!(
            endpoint = %config.endpoint,
            target_records = config.target,
            resources = resources.len(),
            "Starting simulation run"
        );

        let provisioner = Arc::new(StaticProvisioner::new(resources));
        let summary = RunOrchestrator::new(config, provisioner, Arc::new(NoopSettings))
            .with_stop(stop)
            .run()
            .await?;

        match cli.output_format {
            OutputFormat::Json => output_json(&summary),
            OutputFormat::Human => output_human(&summary),
        }

        Ok(())
    }
}

/// Output the run summary as a single JSON line.
fn output_json(summary: &RunSummary) {
    let output = serde_json::json!({
        "run": summary.identifier,
        "paused": summary.paused,
        "processed": summary.processed,
        "successful": summary.successful,
        "rejected": summary.rejected,
        "failed": summary.failed,
        "invalid_sent": summary.invalid_sent,
        "attack_sent": summary.attack_sent,
        "elapsed_secs": summary.elapsed.as_secs_f64(),
        "requests_per_second": summary.dispatcher_stats.requests_per_second,
        "avg_request_ms": summary.dispatcher_stats.avg_time_ms,
    });
    println!("{output}");
}

/// Output the run summary in human-readable form.
fn output_human(summary: &RunSummary) {
    if summary.paused {
        println!("\nRun paused: {}", summary.identifier);
        println!("Progress saved; rerun with --run-name {} to resume", summary.identifier);
    } else {
        println!("\nRun completed: {}", summary.identifier);
    }
    println!("Processed:  {}", summary.processed);
    println!("Successful: {}", summary.successful);
    println!("Rejected:   {}", summary.rejected);
    println!("Failed:     {}", summary.failed);
    if summary.invalid_sent > 0 {
        println!("Invalid payloads sent: {}", summary.invalid_sent);
    }
    if summary.attack_sent > 0 {
        println!("Attack payloads sent:  {}", summary.attack_sent);
    }
    println!(
        "Throughput: {:.1} req/sec (avg {:.1} ms/request)",
        summary.dispatcher_stats.requests_per_second, summary.dispatcher_stats.avg_time_ms
    );
}
