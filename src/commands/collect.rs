//! Collect command implementation

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{print_json, CommandContext};
use super::report::print_season_report;
use crate::error::CollectError;
use crate::pipeline::{Orchestrator, OrchestratorConfig};
use crate::source::{HttpJsonSource, RawGame, RawTeamStat};
use crate::{Result, Season};

pub struct CollectParams {
    pub seasons: Vec<Season>,
    pub force_refresh: bool,
    pub reset_progress: bool,
    pub schedule_url: Option<String>,
    pub stats_url: Option<String>,
    pub as_json: bool,
}

/// Returns true when every season ended complete.
pub async fn handle_collect(
    ctx: &CommandContext,
    params: CollectParams,
    cancel: CancellationToken,
) -> Result<bool> {
    let seasons = ctx.resolve_seasons(&params.seasons)?;
    let sources = &ctx.settings.sources;
    let schedule_url = params
        .schedule_url
        .or_else(|| sources.schedule_url.clone())
        .ok_or_else(|| {
            CollectError::config("no schedule feed: set [sources] schedule_url or --schedule-url")
        })?;
    let stats_url = params
        .stats_url
        .or_else(|| sources.stats_url.clone())
        .ok_or_else(|| {
            CollectError::config("no stats feed: set [sources] stats_url or --stats-url")
        })?;

    let timeout = ctx.settings.collection.request_timeout();
    let primary = HttpJsonSource::<RawGame>::new("schedule", schedule_url, timeout)?;
    let augment = HttpJsonSource::<RawTeamStat>::new("team_stats", stats_url, timeout)?;

    let mut config = OrchestratorConfig::from_settings(&ctx.settings);
    config.reset_progress = params.reset_progress;

    info!(
        seasons = ?seasons,
        force_refresh = params.force_refresh,
        db = %ctx.db_path.display(),
        "starting collection"
    );
    let mut orchestrator = Orchestrator::new(
        ctx.open_db()?,
        ctx.registry.clone(),
        primary,
        augment,
        config,
        cancel,
    );
    let reports = orchestrator
        .collect_seasons(&seasons, params.force_refresh)
        .await?;

    if params.as_json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            print_season_report(report);
        }
    }
    Ok(reports.len() == seasons.len() && reports.iter().all(|r| !r.is_failed()))
}
