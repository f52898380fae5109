//! Reclassify and set-category command implementations

use tracing::info;

use super::common::{print_json, CommandContext};
use crate::cli::types::GameUid;
use crate::error::CollectError;
use crate::season::{reclassify_season, Category};
use crate::{Result, Season};

pub fn handle_reclassify(
    ctx: &CommandContext,
    seasons: &[Season],
    dry_run: bool,
    as_json: bool,
) -> Result<()> {
    let seasons = ctx.resolve_seasons(seasons)?;
    let mut db = ctx.open_db()?;

    let mut summaries = Vec::with_capacity(seasons.len());
    for season in seasons {
        summaries.push(reclassify_season(&mut db, &ctx.registry, season, dry_run)?);
    }

    if as_json {
        return print_json(&summaries);
    }
    for summary in &summaries {
        let verb = if dry_run { "would change" } else { "changed" };
        println!(
            "Season {}: {} unclassified games examined, {} {}",
            summary.season,
            summary.examined,
            summary.changed.len(),
            verb
        );
        for (uid, category) in &summary.changed {
            println!("  {} -> {}", uid, category);
        }
    }
    Ok(())
}

pub fn handle_set_category(ctx: &CommandContext, game: &GameUid, category: Category) -> Result<()> {
    let mut db = ctx.open_db()?;
    let Some(stored) = db.get_game(game)? else {
        return Err(CollectError::malformed(
            format!("game {}", game),
            "no such game in the database",
        ));
    };

    if db.override_category(game, category)? {
        info!(game = %game, from = %stored.category, to = %category, "category overridden");
        println!("✓ {} set to {} (was {})", game, category, stored.category);
    } else {
        println!("{} is already confirmed as {}", game, category);
    }
    Ok(())
}
