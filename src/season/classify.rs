//! Playoff Date Classifier.
//!
//! Classification is a pure function of the date, the season and the
//! registered windows. The reclassify pass applies it to stored games that
//! nothing has categorized yet.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::{Category, SeasonRegistry};
use crate::cli::types::{GameUid, Season};
use crate::storage::GameDatabase;
use crate::Result;

/// Map a game date to its category for `season`.
///
/// Seasons without a registered plan classify everything as regular.
pub fn classify(date: NaiveDate, season: Season, registry: &SeasonRegistry) -> Category {
    registry
        .plan(season)
        .map(|plan| plan.classify(date))
        .unwrap_or(Category::Regular)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReclassifySummary {
    pub season: Season,
    /// Games that had no category assignment yet.
    pub examined: usize,
    /// Games whose category was (or would be, on a dry run) rewritten.
    pub changed: Vec<(GameUid, Category)>,
    pub dry_run: bool,
}

/// Assign playoff categories to the season's unclassified games.
///
/// Running it twice changes nothing the second time.
pub fn reclassify_season(
    db: &mut GameDatabase,
    registry: &SeasonRegistry,
    season: Season,
    dry_run: bool,
) -> Result<ReclassifySummary> {
    registry.require(season)?;
    let pending = db.unclassified_games(season)?;

    let mut summary = ReclassifySummary {
        season,
        examined: pending.len(),
        changed: Vec::new(),
        dry_run,
    };

    for (uid, scheduled_at) in pending {
        let category = classify(scheduled_at.date(), season, registry);
        if category == Category::Regular {
            continue;
        }
        debug!(game = %uid, %category, "reclassifying game");
        if dry_run || db.set_category(&uid, category)? {
            summary.changed.push((uid, category));
        }
    }

    info!(
        %season,
        examined = summary.examined,
        changed = summary.changed.len(),
        dry_run,
        "reclassify complete"
    );
    Ok(summary)
}
