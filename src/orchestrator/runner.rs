//! Run orchestrator phase machine

use super::config::progress_cadence;
use super::progress::{format_duration, ProgressSnapshot};
use super::SimulatorError;
use crate::checkpoint::CheckpointStore;
use crate::config::RunConfiguration;
use crate::dispatcher::{DispatcherStats, HttpDispatcher, RequestDispatcher};
use crate::generator::{AttackPayloadGenerator, InvalidPayloadGenerator, NormalPayloadGenerator};
use crate::identifier::RunIdentifier;
use crate::metrics::RunMetrics;
use crate::provision::{Provisioner, Resource, SimUser, TargetSettings};
use crate::selector::RequestTypeSelector;
use crate::stop::{self, SharedStop};
use crate::stream::RequestStream;
use futures_util::StreamExt;
use tracing::Instrument;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Minimum user pool for logged-in-visitor simulation.
const MIN_USERS: usize = 5;

/// Final accounting for one run invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Sanitized run identifier
    pub identifier: String,
    /// Cumulative processed count (across resumes)
    pub processed: u64,
    /// Cumulative successful count
    pub successful: u64,
    /// Cumulative failed count
    pub failed: u64,
    /// Cumulative rejected count
    pub rejected: u64,
    /// Invalid-class requests sent, independent of outcome
    pub invalid_sent: u64,
    /// Attack-class requests sent, independent of outcome
    pub attack_sent: u64,
    /// Cumulative wall-clock processing time
    pub elapsed: Duration,
    /// Whether the run exited via the cooperative stop path
    pub paused: bool,
    /// Dispatcher throughput statistics for this invocation
    pub dispatcher_stats: DispatcherStats,
}

/// Sequences a complete simulation run.
///
/// Single-threaded and cooperative: one classify → submit → await-outcome →
/// account step at a time from this side. Network concurrency happens inside
/// the dispatcher.
pub struct RunOrchestrator {
    config: RunConfiguration,
    provisioner: Arc<dyn Provisioner>,
    settings: Arc<dyn TargetSettings>,
    dispatcher: Option<Arc<dyn RequestDispatcher>>,
    stop: Option<SharedStop>,
}

impl RunOrchestrator {
    /// Create an orchestrator over the given collaborators.
    ///
    /// Picks up the globally registered stop handle when one exists.
    pub fn new(
        config: RunConfiguration,
        provisioner: Arc<dyn Provisioner>,
        settings: Arc<dyn TargetSettings>,
    ) -> Self {
        Self {
            config,
            provisioner,
            settings,
            dispatcher: None,
            stop: stop::get_global_stop(),
        }
    }

    /// Substitute the dispatcher (used by tests and custom transports).
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn RequestDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Attach a stop handle for cooperative pause.
    pub fn with_stop(mut self, stop: SharedStop) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map(|s| s.is_stop_requested())
            .unwrap_or(false)
    }

    /// Execute the full phase sequence.
    ///
    /// Returns the final summary, or the fatal error after marking the
    /// checkpoint `failed`. A cooperative stop returns `Ok` with
    /// `paused = true`.
    pub async fn run(self) -> Result<RunSummary, SimulatorError> {
        let span = tracing::info_span!(
            "simulation_run",
            target_records = self.config.target,
            endpoint = %self.config.endpoint
        );
        self.run_phases().instrument(span).await
    }

    async fn run_phases(mut self) -> Result<RunSummary, SimulatorError> {
        self.config
            .validate()
            .map_err(SimulatorError::ValidationError)?;

        let run_metrics = RunMetrics::start(self.config.target);

        // Phase 1: Setup
        info!("Verifying target settings");
        let settings_ok = self
            .settings
            .ensure_settings(self.config.auto_configure_settings)
            .await?;
        if !settings_ok {
            return Err(SimulatorError::SettingsError(
                "tracker settings are incorrect and auto-configure did not repair them"
                    .to_string(),
            ));
        }

        let dispatcher: Arc<dyn RequestDispatcher> = match self.dispatcher.take() {
            Some(dispatcher) => dispatcher,
            None => Arc::new(HttpDispatcher::new(
                self.config.endpoint.clone(),
                self.config.concurrency,
                self.config.connect_timeout,
                self.config.request_timeout,
                self.config.max_retries,
                self.config.request_delay,
            )?),
        };

        // Adversarial generators only exist when their ratio is in play
        let invalid_gen = (self.config.invalid_ratio > 0.0).then(InvalidPayloadGenerator::new);
        let attack_gen = (self.config.attack_ratio > 0.0).then(AttackPayloadGenerator::new);

        // Phase 2: Provision
        info!("Provisioning trackable content");
        let resources = self.provisioner.ensure_resources().await?;
        if resources.is_empty() {
            return Err(SimulatorError::NoResources);
        }
        let users = if self.config.logged_in_ratio > 0.0 {
            self.provisioner.ensure_users(MIN_USERS).await?
        } else {
            Vec::new()
        };
        debug!(
            resources = resources.len(),
            users = users.len(),
            "Provisioning complete"
        );

        // Phase 3: CheckpointInit
        let identifier = match &self.config.run_name {
            Some(name) => RunIdentifier::new(name)
                .map_err(|e| SimulatorError::ValidationError(e.to_string()))?,
            None => RunIdentifier::timestamped(),
        };
        let mut store =
            CheckpointStore::initialize(&self.config.checkpoint_dir, &identifier, &self.config);

        // Phase 4: Execute
        let result = self
            .execute(&dispatcher, &mut store, resources, users, invalid_gen, attack_gen)
            .await;

        match result {
            Ok(true) => {
                // Cooperative stop: paused checkpoint, normal return
                let summary = Self::summarize(&identifier, &store, &dispatcher, true);
                info!(
                    processed = summary.processed,
                    "Run paused; resume with the same configuration to continue"
                );
                Ok(summary)
            }
            Ok(false) => {
                // Phase 5: Finalize
                store.mark_complete();
                if self.config.restore_settings {
                    match self.settings.restore_settings().await {
                        Ok(restored) => debug!(restored = restored, "Settings restore"),
                        Err(e) => warn!(error = %e, "Failed to restore settings"),
                    }
                }
                let summary = Self::summarize(&identifier, &store, &dispatcher, false);
                run_metrics.record_success(summary.processed);
                info!(
                    processed = summary.processed,
                    successful = summary.successful,
                    rejected = summary.rejected,
                    failed = summary.failed,
                    invalid_sent = summary.invalid_sent,
                    attack_sent = summary.attack_sent,
                    requests_per_second = summary.dispatcher_stats.requests_per_second,
                    elapsed = %format_duration(summary.elapsed),
                    "Run completed"
                );
                Ok(summary)
            }
            Err(e) => {
                let message = e.to_string();
                store.mark_failed(&message);
                run_metrics.record_failure(&message);
                Err(e)
            }
        }
    }

    /// Execute phase: drain outcomes, account, checkpoint, report.
    ///
    /// Returns whether the run exited via the cooperative stop path.
    async fn execute(
        &self,
        dispatcher: &Arc<dyn RequestDispatcher>,
        store: &mut CheckpointStore,
        resources: Vec<Resource>,
        users: Vec<SimUser>,
        invalid_gen: Option<InvalidPayloadGenerator>,
        attack_gen: Option<AttackPayloadGenerator>,
    ) -> Result<bool, SimulatorError> {
        let remaining = store.remaining();
        if remaining == 0 {
            info!("Target already reached; nothing to execute");
            return Ok(false);
        }
        if store.resumed() {
            info!(
                processed = store.state().processed(),
                remaining = remaining,
                "Resuming with reduced remaining target"
            );
        }

        let selector =
            RequestTypeSelector::new(self.config.invalid_ratio, self.config.attack_ratio);
        let normal_gen = NormalPayloadGenerator::new(
            resources,
            users,
            self.config.logged_in_ratio,
            self.config.date_from,
            self.config.date_to,
        );
        let requests = RequestStream::new(
            selector,
            normal_gen,
            invalid_gen,
            attack_gen,
            self.config.seed,
        );

        let mut outcomes = dispatcher
            .stream_requests(Box::new(requests), remaining)
            .await?;

        let cadence = progress_cadence(self.config.target);
        let mut received = 0u64;

        if self.stop_requested() {
            store.pause();
            return Ok(true);
        }

        while let Some(outcome) = outcomes.next().await {
            store.record_processed(outcome.status, outcome.data_class);
            crate::metrics::record_request(outcome.status, outcome.data_class);
            received += 1;

            if received % cadence == 0 {
                let state = store.state();
                let snapshot = ProgressSnapshot::from_counters(
                    state.processed(),
                    state.successful(),
                    state.target(),
                    state.elapsed_seconds(),
                );
                info!("{}", snapshot.format_progress());
            }

            // Cooperative cancellation between yielded outcomes only
            if self.stop_requested() {
                store.pause();
                return Ok(true);
            }
        }

        if received < remaining {
            return Err(SimulatorError::StreamEndedEarly {
                received,
                expected: remaining,
            });
        }

        Ok(false)
    }

    fn summarize(
        identifier: &RunIdentifier,
        store: &CheckpointStore,
        dispatcher: &Arc<dyn RequestDispatcher>,
        paused: bool,
    ) -> RunSummary {
        let state = store.state();
        RunSummary {
            identifier: identifier.as_str().to_string(),
            processed: state.processed(),
            successful: state.successful(),
            failed: state.failed(),
            rejected: state.rejected(),
            invalid_sent: state.invalid_data_count(),
            attack_sent: state.attack_data_count(),
            elapsed: Duration::from_secs_f64(state.elapsed_seconds()),
            paused,
            dispatcher_stats: dispatcher.stats(),
        }
    }
}
