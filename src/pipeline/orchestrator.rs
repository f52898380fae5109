//! Collection Orchestrator.
//!
//! Drives one season at a time through
//! `Pending → FetchingPrimary → FetchingAugmentation → Verifying → Complete | Failed`.
//! Fetches may run concurrently; every write happens on the orchestrator's
//! own task, one game (or one game's stat batch) per transaction.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{FixedOffset, Offset, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::progress::{checkpoint_file, run_id, ProgressPolicy, ProgressTracker};
use super::verify::{verify_season, VerificationReport, VerifyPolicy};
use crate::cli::types::{GameUid, Season, Week};
use crate::core::backoff::{retry_with_backoff, RetryFailure, RetryPolicy};
use crate::core::config::Settings;
use crate::error::CollectError;
use crate::season::{reclassify_season, Category, SeasonPlan, SeasonRegistry};
use crate::source::raw::{normalize_game, normalize_stat};
use crate::source::{FetchRequest, FetchScope, RawGame, RawTeamStat, SourceAdapter, SourceError};
use crate::storage::{GameDatabase, UpsertOutcome};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonState {
    Pending,
    FetchingPrimary,
    FetchingAugmentation,
    Verifying,
    Complete,
    Failed,
}

impl SeasonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonState::Pending => "pending",
            SeasonState::FetchingPrimary => "fetching_primary",
            SeasonState::FetchingAugmentation => "fetching_augmentation",
            SeasonState::Verifying => "verifying",
            SeasonState::Complete => "complete",
            SeasonState::Failed => "failed",
        }
    }
}

/// One season's pass through the state machine
struct SeasonSession {
    season: Season,
    state: SeasonState,
    started: Instant,
}

impl SeasonSession {
    fn new(season: Season) -> Self {
        Self {
            season,
            state: SeasonState::Pending,
            started: Instant::now(),
        }
    }

    fn transition_to(&mut self, state: SeasonState) {
        info!(
            season = %self.season,
            from = self.state.as_str(),
            to = state.as_str(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "season state transition"
        );
        self.state = state;
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub progress: ProgressPolicy,
    pub outage_threshold: u32,
    pub verify: VerifyPolicy,
    /// Directory holding one checkpoint file per season.
    pub progress_dir: PathBuf,
    /// Discard existing checkpoints before collecting.
    pub reset_progress: bool,
    /// Local offset applied to UTC kickoffs before classification.
    pub kickoff_offset: FixedOffset,
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let collection = &settings.collection;
        Self {
            retry: collection.retry_policy(),
            request_timeout: collection.request_timeout(),
            concurrency: collection.concurrency.max(1),
            progress: collection.progress_policy(),
            outage_threshold: collection.augmentation_outage_threshold.max(1),
            verify: settings.verification.policy(),
            progress_dir: settings.progress_dir(),
            reset_progress: false,
            kickoff_offset: collection.kickoff_offset().unwrap_or_else(|_| Utc.fix()),
        }
    }
}

/// Counters for one season's run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub units_fetched: u32,
    pub games_inserted: u32,
    pub games_updated: u32,
    pub games_unchanged: u32,
    pub stats_inserted: u32,
    pub stats_updated: u32,
    pub stats_unchanged: u32,
    pub malformed: u32,
    pub fetch_failures: u32,
    pub reclassified: u32,
}

impl RunStats {
    fn count_game(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.games_inserted += 1,
            UpsertOutcome::Updated => self.games_updated += 1,
            UpsertOutcome::Unchanged => self.games_unchanged += 1,
        }
    }

    fn count_stat(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.stats_inserted += 1,
            UpsertOutcome::Updated => self.stats_updated += 1,
            UpsertOutcome::Unchanged => self.stats_unchanged += 1,
        }
    }
}

/// Final word on a season: always carries expected/collected/missing.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonReport {
    pub season: Season,
    pub state: SeasonState,
    pub cause: Option<String>,
    /// Pre-flight found the season complete; nothing was fetched.
    pub skipped: bool,
    pub expected: u32,
    pub collected: u32,
    pub missing: u32,
    pub stats: RunStats,
    /// Uids that reached the retry ceiling and are no longer attempted.
    pub excluded: Vec<String>,
    /// Failed uids the next run will retry.
    pub pending_failures: Vec<String>,
    pub verification: Option<VerificationReport>,
}

impl SeasonReport {
    pub fn is_failed(&self) -> bool {
        self.state == SeasonState::Failed
    }

    fn new(season: Season, state: SeasonState, verification: Option<VerificationReport>) -> Self {
        let (expected, collected, missing) = verification
            .as_ref()
            .map(|v| {
                (
                    v.completeness.expected_total,
                    v.completeness.collected_total,
                    v.completeness.missing_total,
                )
            })
            .unwrap_or_default();
        Self {
            season,
            state,
            cause: None,
            skipped: false,
            expected,
            collected,
            missing,
            stats: RunStats::default(),
            excluded: Vec::new(),
            pending_failures: Vec::new(),
            verification,
        }
    }
}

enum PassEnd {
    Finished,
    Unavailable(CollectError),
    Cancelled,
}

/// Runs collection for one or more seasons against a primary schedule source
/// and an augmentation (team stats) source.
pub struct Orchestrator<P, A> {
    db: GameDatabase,
    registry: SeasonRegistry,
    primary: P,
    augment: A,
    config: OrchestratorConfig,
    cancel: CancellationToken,
}

impl<P, A> Orchestrator<P, A>
where
    P: SourceAdapter<Record = RawGame>,
    A: SourceAdapter<Record = RawTeamStat>,
{
    pub fn new(
        db: GameDatabase,
        registry: SeasonRegistry,
        primary: P,
        augment: A,
        config: OrchestratorConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            db,
            registry,
            primary,
            augment,
            config,
            cancel,
        }
    }

    pub fn database(&self) -> &GameDatabase {
        &self.db
    }

    pub fn into_database(self) -> GameDatabase {
        self.db
    }

    /// Collect each season in turn. A season's failure is recorded in its
    /// report and does not stop the others; an unregistered season is a
    /// configuration error raised before anything is fetched.
    pub async fn collect_seasons(
        &mut self,
        seasons: &[Season],
        force_refresh: bool,
    ) -> Result<Vec<SeasonReport>> {
        for season in seasons {
            self.registry.require(*season)?;
        }

        let mut reports = Vec::with_capacity(seasons.len());
        for &season in seasons {
            match self.collect_season(season, force_refresh).await {
                Ok(report) => reports.push(report),
                Err(CollectError::Cancelled) => {
                    reports.push(self.failed_report(season, "collection cancelled".to_string()));
                    break;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(%season, error = %e, "season collection failed");
                    let report = self.failed_report(season, e.to_string());
                    if let Err(e) = self.db.record_season_state(
                        season,
                        SeasonState::Failed.as_str(),
                        report.cause.as_deref(),
                    ) {
                        warn!(%season, error = %e, "could not record season state");
                    }
                    reports.push(report);
                }
            }
        }
        Ok(reports)
    }

    fn failed_report(&self, season: Season, cause: String) -> SeasonReport {
        let verification =
            verify_season(&self.db, &self.registry, season, &self.config.verify).ok();
        let mut report = SeasonReport::new(season, SeasonState::Failed, verification);
        report.cause = Some(cause);
        report
    }

    pub async fn collect_season(
        &mut self,
        season: Season,
        force_refresh: bool,
    ) -> Result<SeasonReport> {
        let plan = self.registry.require(season)?.clone();
        let mut session = SeasonSession::new(season);
        let mut tracker = ProgressTracker::load(
            &checkpoint_file(&self.config.progress_dir, season),
            &run_id(season),
            self.config.reset_progress,
            self.config.progress,
        )?;

        if !force_refresh {
            let preflight = verify_season(&self.db, &self.registry, season, &self.config.verify)?;
            if preflight.is_complete() && tracker.pending_failures().is_empty() {
                info!(%season, "season already complete, skipping collection");
                session.transition_to(SeasonState::Complete);
                self.persist(&session, None)?;
                let mut report = SeasonReport::new(season, SeasonState::Complete, Some(preflight));
                report.skipped = true;
                report.excluded = tracker.excluded();
                return Ok(report);
            }
        }

        self.persist(&session, None)?;
        let mut stats = RunStats::default();

        session.transition_to(SeasonState::FetchingPrimary);
        self.persist(&session, None)?;
        let primary_end = self
            .primary_pass(&plan, &mut tracker, &mut stats, force_refresh)
            .await?;

        let mut failure = match primary_end {
            PassEnd::Finished => None,
            PassEnd::Unavailable(e) => Some(e.to_string()),
            PassEnd::Cancelled => return self.cancelled(&mut session, &mut tracker),
        };

        let reclassified = reclassify_season(&mut self.db, &self.registry, season, false)?;
        stats.reclassified = reclassified.changed.len() as u32;

        if failure.is_none() {
            session.transition_to(SeasonState::FetchingAugmentation);
            self.persist(&session, None)?;
            match self
                .augmentation_pass(season, &mut tracker, &mut stats, force_refresh)
                .await?
            {
                PassEnd::Finished => {}
                PassEnd::Unavailable(e) => failure = Some(e.to_string()),
                PassEnd::Cancelled => return self.cancelled(&mut session, &mut tracker),
            }
        }

        tracker.checkpoint()?;

        session.transition_to(SeasonState::Verifying);
        self.persist(&session, None)?;
        let verification = verify_season(&self.db, &self.registry, season, &self.config.verify)?;
        for issue in &verification.consistency {
            match issue.to_violation() {
                Some(violation) => warn!(%season, error = %violation, "consistency issue"),
                None => warn!(%season, %issue, "consistency issue"),
            }
        }

        let pending = tracker.pending_failures();
        if failure.is_none() {
            if verification.completeness.missing_total > 0 {
                failure = Some(format!(
                    "{} of {} expected games missing",
                    verification.completeness.missing_total, verification.completeness.expected_total
                ));
            } else if !pending.is_empty() {
                failure = Some(format!(
                    "{} records failed and will be retried",
                    pending.len()
                ));
            }
        }

        let state = if failure.is_some() {
            SeasonState::Failed
        } else {
            SeasonState::Complete
        };
        session.transition_to(state);
        self.persist(&session, failure.as_deref())?;

        let mut report = SeasonReport::new(season, state, Some(verification));
        report.cause = failure;
        report.stats = stats;
        report.excluded = tracker.excluded();
        report.pending_failures = pending;
        Ok(report)
    }

    fn persist(&mut self, session: &SeasonSession, cause: Option<&str>) -> Result<()> {
        self.db
            .record_season_state(session.season, session.state.as_str(), cause)?;
        Ok(())
    }

    /// Flush progress and mark the season failed before unwinding.
    fn cancelled(
        &mut self,
        session: &mut SeasonSession,
        tracker: &mut ProgressTracker,
    ) -> Result<SeasonReport> {
        tracker.checkpoint()?;
        session.transition_to(SeasonState::Failed);
        self.persist(session, Some("collection cancelled"))?;
        Err(CollectError::Cancelled)
    }

    /// Fetch the schedule week by week, then round by round, writing in
    /// fetch order.
    async fn primary_pass(
        &mut self,
        plan: &SeasonPlan,
        tracker: &mut ProgressTracker,
        stats: &mut RunStats,
        force_refresh: bool,
    ) -> Result<PassEnd> {
        let season = plan.season;
        let units: Vec<FetchScope> = (1..=plan.regular_weeks)
            .map(|week| FetchScope::Week(Week::new(week)))
            .chain(plan.rounds.keys().map(|c| FetchScope::Round(*c)))
            .collect();

        for scope in units {
            if self.cancel.is_cancelled() {
                return Ok(PassEnd::Cancelled);
            }
            let uid = format!("schedule:{}:{}", season, scope);
            if !tracker.should_attempt(&uid, force_refresh) {
                continue;
            }

            let request = FetchRequest::new(season, scope);
            match fetch_with_retry(
                &self.primary,
                &request,
                &self.config.retry,
                self.config.request_timeout,
                &self.cancel,
            )
            .await
            {
                Ok(records) => {
                    stats.units_fetched += 1;
                    debug!(%season, unit = %request.scope, records = records.len(), "schedule unit fetched");
                    for raw in &records {
                        store_game(
                            &mut self.db,
                            plan,
                            raw,
                            self.primary.name(),
                            self.config.kickoff_offset,
                            stats,
                        )?;
                    }
                    tracker.record_success(&uid);
                }
                Err(RetryFailure::NotFound) => {
                    warn!(%season, unit = %request.scope, "schedule unit not found");
                    stats.fetch_failures += 1;
                    tracker.record_failure(&uid);
                }
                Err(RetryFailure::Exhausted { attempts, last }) => {
                    stats.fetch_failures += 1;
                    tracker.record_failure(&uid);
                    tracker.checkpoint()?;
                    return Ok(PassEnd::Unavailable(unavailable(
                        self.primary.name(),
                        attempts,
                        &last,
                    )));
                }
                Err(RetryFailure::Cancelled) => return Ok(PassEnd::Cancelled),
            }
            tracker.maybe_checkpoint()?;
        }
        Ok(PassEnd::Finished)
    }

    /// Fetch team stats for every known game of the season, a bounded number
    /// of requests in flight; results are written as they arrive.
    async fn augmentation_pass(
        &mut self,
        season: Season,
        tracker: &mut ProgressTracker,
        stats: &mut RunStats,
        force_refresh: bool,
    ) -> Result<PassEnd> {
        let targets: Vec<GameUid> = self
            .db
            .season_game_uids(season)?
            .into_iter()
            .filter(|uid| tracker.should_attempt(uid.as_str(), force_refresh))
            .collect();
        info!(%season, games = targets.len(), "augmenting games with team stats");

        let augment = &self.augment;
        let retry = &self.config.retry;
        let timeout = self.config.request_timeout;
        let cancel = &self.cancel;
        let mut results = stream::iter(targets.into_iter().map(|uid| async move {
            let request = FetchRequest::new(season, FetchScope::Game(uid.clone()));
            let result = fetch_with_retry(augment, &request, retry, timeout, cancel).await;
            (uid, result)
        }))
        .buffer_unordered(self.config.concurrency);

        let mut consecutive_outages = 0;
        while let Some((uid, result)) = results.next().await {
            match result {
                Ok(records) => {
                    consecutive_outages = 0;
                    let mut lines = Vec::with_capacity(records.len());
                    for raw in &records {
                        match normalize_stat(raw, season, augment.name()) {
                            Ok(line) if line.game_uid == uid => lines.push(line),
                            Ok(line) => {
                                warn!(game = %uid, got = %line.game_uid, "stats for another game, skipping");
                                stats.malformed += 1;
                            }
                            Err(e) => {
                                warn!(game = %uid, error = %e, "skipping malformed stats record");
                                stats.malformed += 1;
                            }
                        }
                    }

                    if lines.is_empty() {
                        debug!(game = %uid, "no usable stats returned");
                        tracker.record_failure(uid.as_str());
                    } else {
                        for outcome in self.db.upsert_team_stats(&lines)? {
                            stats.count_stat(outcome);
                        }
                        tracker.record_success(uid.as_str());
                    }
                }
                Err(RetryFailure::NotFound) => {
                    consecutive_outages = 0;
                    stats.fetch_failures += 1;
                    tracker.record_failure(uid.as_str());
                }
                Err(RetryFailure::Exhausted { attempts, last }) => {
                    stats.fetch_failures += 1;
                    tracker.record_failure(uid.as_str());
                    consecutive_outages += 1;
                    if consecutive_outages >= self.config.outage_threshold {
                        error!(
                            %season,
                            consecutive = consecutive_outages,
                            "stats source unavailable, ending augmentation"
                        );
                        return Ok(PassEnd::Unavailable(unavailable(
                            augment.name(),
                            attempts,
                            &last,
                        )));
                    }
                }
                Err(RetryFailure::Cancelled) => return Ok(PassEnd::Cancelled),
            }
            tracker.maybe_checkpoint()?;
            if cancel.is_cancelled() {
                return Ok(PassEnd::Cancelled);
            }
        }
        Ok(PassEnd::Finished)
    }
}

/// Normalise, classify and upsert one schedule record. Malformed records are
/// logged and skipped.
fn store_game(
    db: &mut GameDatabase,
    plan: &SeasonPlan,
    raw: &RawGame,
    source: &str,
    kickoff_offset: FixedOffset,
    stats: &mut RunStats,
) -> Result<()> {
    let (mut game, teams) = match normalize_game(raw, plan.season, source, kickoff_offset) {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!(season = %plan.season, error = %e, "skipping malformed schedule record");
            stats.malformed += 1;
            return Ok(());
        }
    };

    if let Some(scheduled_at) = game.scheduled_at {
        game.category = plan.classify(scheduled_at.date());
    }
    // Playoff games carry no regular-season week.
    if game.category != Category::Regular {
        game.week = None;
    }

    let outcome = db.upsert_game(&game, &teams)?;
    stats.count_game(outcome);
    Ok(())
}

/// One adapter call per attempt, each bounded by `timeout`.
async fn fetch_with_retry<S: SourceAdapter>(
    source: &S,
    request: &FetchRequest,
    policy: &RetryPolicy,
    timeout: Duration,
    cancel: &CancellationToken,
) -> std::result::Result<Vec<S::Record>, RetryFailure> {
    let operation = format!("{} {}", source.name(), request.scope);
    retry_with_backoff(&operation, policy, cancel, || async move {
        match tokio::time::timeout(timeout, source.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::transient(format!(
                "request timed out after {}s",
                timeout.as_secs()
            ))),
        }
    })
    .await
}

fn unavailable(source: &str, attempts: u32, last: &SourceError) -> CollectError {
    CollectError::SourceUnavailable {
        source_name: source.to_string(),
        attempts,
        message: last.to_string(),
    }
}
