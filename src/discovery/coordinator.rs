//! Discovery coordinator - dispatch, bounded polling, filtering and scoring
//!
//! One call to [`PollingCoordinator::discover`] is one session:
//! - Dispatch the scrape job once
//! - Sample the results feed every interval until a qualifying row appears
//! - Stop at the deadline, or immediately when the caller cancels
//!
//! Failed snapshots are transient misses. The session only fails for lack of
//! data when not a single snapshot succeeded before the deadline.

use crate::config::{Config, MatchMode};
use crate::discovery::state::SessionState;
use crate::dispatch::{DispatchError, Dispatcher, HttpDispatcher, ScrapeJob};
use crate::feed::{CandidateRecord, HttpResultStore, ResultStore, SourceUnavailable};
use crate::geo::{filter_within_radius, Coordinate};
use crate::http::build_http_client;
use crate::scoring::score_all;
use crate::ScoutError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_util::sync::CancellationToken;

/// Session-level failures surfaced to the caller
///
/// "No results within the deadline" is not an error; see
/// [`DiscoveryOutcome::NoMatchWithinDeadline`].
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not start the search: {0}")]
    DispatchFailed(#[from] DispatchError),

    #[error("results feed unavailable for the whole session ({attempts} attempts): {last_error}")]
    SourceUnavailable { attempts: u32, last_error: String },

    #[error("discovery cancelled")]
    Cancelled,
}

impl DiscoveryError {
    /// Whether re-running the whole discovery may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DispatchFailed(DispatchError::InvalidJob(_)) => false,
            Self::DispatchFailed(_) | Self::SourceUnavailable { .. } => true,
            Self::Cancelled => false,
        }
    }

    /// Terminal state the session ended in
    pub fn state(&self) -> SessionState {
        match self {
            Self::Cancelled => SessionState::Cancelled,
            _ => SessionState::Failed,
        }
    }
}

/// Timing and filtering for discovery sessions
#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    pub radius_km: f64,
    pub interval: Duration,
    pub deadline: Duration,
    pub initial_delay: Duration,
    pub match_mode: MatchMode,
    pub completed_statuses: Vec<String>,
}

impl PollingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            radius_km: config.polling.radius_km,
            interval: config.polling.interval(),
            deadline: config.polling.deadline(),
            initial_delay: config.polling.initial_delay(),
            match_mode: config.polling.match_mode,
            completed_statuses: config.results_feed.columns.completed_statuses.clone(),
        }
    }
}

/// Counters for one polling session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    pub snapshots_attempted: u32,
    pub snapshots_succeeded: u32,
    pub snapshots_failed: u32,
    pub rows_skipped: usize,
    pub elapsed_ms: u64,
}

/// How a session that reached the polling state ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "candidates", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    /// Scored candidates within the radius, in feed order
    Matched(Vec<CandidateRecord>),

    /// The deadline passed without a qualifying row; the caller may retry
    /// later or widen the radius
    NoMatchWithinDeadline,
}

impl DiscoveryOutcome {
    pub fn candidates(&self) -> &[CandidateRecord] {
        match self {
            Self::Matched(candidates) => candidates,
            Self::NoMatchWithinDeadline => &[],
        }
    }

    pub fn state(&self) -> SessionState {
        match self {
            Self::Matched(_) => SessionState::Matched,
            Self::NoMatchWithinDeadline => SessionState::TimedOut,
        }
    }
}

/// Everything a finished session hands back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub job: ScrapeJob,
    #[serde(flatten)]
    pub outcome: DiscoveryOutcome,
    pub stats: PollStats,
}

/// Tracks and logs the state of one session
struct Session {
    state: SessionState,
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::Dispatching,
        }
    }

    fn advance(&mut self, next: SessionState) {
        match self.state.transition(next) {
            Ok(state) => {
                tracing::debug!("Discovery session {} -> {}", self.state, state);
                self.state = state;
            }
            Err(e) => {
                debug_assert!(false, "{}", e);
                tracing::error!("{}", e);
            }
        }
    }
}

/// Orchestrates discovery sessions
///
/// Holds no per-session state; one coordinator serves any number of
/// concurrent sessions.
#[derive(Clone)]
pub struct PollingCoordinator {
    dispatcher: Arc<dyn Dispatcher>,
    store: Arc<dyn ResultStore>,
    settings: PollingSettings,
}

impl PollingCoordinator {
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        store: Arc<dyn ResultStore>,
        settings: PollingSettings,
    ) -> Self {
        Self {
            dispatcher,
            store,
            settings,
        }
    }

    /// Wires the HTTP dispatcher and results store described by `config`
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.client)?;
        let dispatcher = HttpDispatcher::new(client.clone(), config.dispatch.clone());
        let store = HttpResultStore::new(client, &config.results_feed);

        Ok(Self::new(
            Arc::new(dispatcher),
            Arc::new(store),
            PollingSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &PollingSettings {
        &self.settings
    }

    /// Dispatches a scrape for `business_type` around `origin` and waits for
    /// qualifying results
    ///
    /// # Returns
    ///
    /// * `Ok(report)` - Matched candidates, or an explicit no-match-within-deadline outcome
    /// * `Err(DiscoveryError::DispatchFailed)` - The job could not be started; no polling happened
    /// * `Err(DiscoveryError::SourceUnavailable)` - Every snapshot failed until the deadline
    /// * `Err(DiscoveryError::Cancelled)` - `cancel` fired
    pub async fn discover(
        &self,
        origin: Coordinate,
        business_type: &str,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let mut session = Session::new();
        tracing::info!(
            "Starting discovery for '{}' around {} (radius {} km)",
            business_type,
            origin,
            self.settings.radius_km
        );

        let dispatched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.advance(SessionState::Cancelled);
                return Err(DiscoveryError::Cancelled);
            }
            result = self.dispatcher.dispatch(business_type, origin) => result,
        };

        let job = match dispatched {
            Ok(job) => job,
            Err(e) => {
                session.advance(SessionState::Failed);
                tracing::error!("Dispatch failed for '{}': {}", business_type, e);
                return Err(DiscoveryError::DispatchFailed(e));
            }
        };

        session.advance(SessionState::Polling);
        let result = self.poll(&job, cancel).await;

        match &result {
            Ok((outcome, stats)) => {
                session.advance(outcome.state());
                tracing::info!(
                    "Discovery for {} ended {} with {} candidates after {} snapshots",
                    job.job_url,
                    outcome.state(),
                    outcome.candidates().len(),
                    stats.snapshots_attempted
                );
            }
            Err(e) => {
                session.advance(e.state());
                tracing::error!("Discovery for {} ended {}: {}", job.job_url, e.state(), e);
            }
        }

        let (outcome, stats) = result?;
        Ok(DiscoveryReport {
            job,
            outcome,
            stats,
        })
    }

    /// Filters and scores the current feed contents without dispatching
    pub async fn discover_near_existing(
        &self,
        origin: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<CandidateRecord>, SourceUnavailable> {
        let snapshot = self.store.snapshot().await?;
        let mut candidates = filter_within_radius(snapshot.records, origin, radius_km);
        score_all(&mut candidates);

        tracing::info!(
            "Found {} existing candidates within {} km of {}",
            candidates.len(),
            radius_km,
            origin
        );
        Ok(candidates)
    }

    /// The polling state: sample until a match, the deadline, or cancellation
    async fn poll(
        &self,
        job: &ScrapeJob,
        cancel: &CancellationToken,
    ) -> Result<(DiscoveryOutcome, PollStats), DiscoveryError> {
        let started = Instant::now();
        let deadline = started + self.settings.deadline;
        let mut stats = PollStats::default();
        let mut last_error: Option<String> = None;

        if !self.settings.initial_delay.is_zero() {
            let first_poll = (started + self.settings.initial_delay).min(deadline);
            if !pause_until(first_poll, cancel).await {
                return Err(DiscoveryError::Cancelled);
            }
        }

        while Instant::now() < deadline {
            stats.snapshots_attempted += 1;

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                result = timeout_at(deadline, self.store.snapshot()) => {
                    result.unwrap_or(Err(SourceUnavailable::Deadline))
                }
            };

            match fetched {
                Ok(snapshot) => {
                    stats.snapshots_succeeded += 1;
                    stats.rows_skipped += snapshot.skipped_rows;

                    let mut matched = self.qualifying(snapshot.records, job);
                    if !matched.is_empty() {
                        score_all(&mut matched);
                        stats.elapsed_ms = elapsed_ms(started);
                        return Ok((DiscoveryOutcome::Matched(matched), stats));
                    }
                    tracing::debug!(
                        "Snapshot {} had no qualifying rows for {}",
                        stats.snapshots_attempted,
                        job.job_url
                    );
                }
                Err(e) => {
                    stats.snapshots_failed += 1;
                    tracing::warn!("Snapshot {} failed: {}", stats.snapshots_attempted, e);
                    last_error = Some(e.to_string());
                }
            }

            let next_poll = (Instant::now() + self.settings.interval).min(deadline);
            if !pause_until(next_poll, cancel).await {
                return Err(DiscoveryError::Cancelled);
            }
        }

        stats.elapsed_ms = elapsed_ms(started);

        if stats.snapshots_succeeded == 0 {
            return Err(DiscoveryError::SourceUnavailable {
                attempts: stats.snapshots_attempted,
                last_error: last_error.unwrap_or_else(|| "no snapshot attempted".to_string()),
            });
        }

        Ok((DiscoveryOutcome::NoMatchWithinDeadline, stats))
    }

    /// Rows of one snapshot that satisfy the session's match rule
    fn qualifying(&self, records: Vec<CandidateRecord>, job: &ScrapeJob) -> Vec<CandidateRecord> {
        let nearby = filter_within_radius(records, job.origin, self.settings.radius_km);
        match self.settings.match_mode {
            MatchMode::Nearby => nearby,
            MatchMode::AwaitJob => nearby
                .into_iter()
                .filter(|r| r.completes_job(&job.job_url, &self.settings.completed_statuses))
                .collect(),
        }
    }
}

impl std::fmt::Debug for PollingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingCoordinator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Sleeps until `until`; returns false if cancelled first
async fn pause_until(until: Instant, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep_until(until) => true,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
