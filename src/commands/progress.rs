//! Progress show/reset command implementations

use serde::Serialize;

use super::common::{print_json, CommandContext};
use crate::pipeline::progress::{run_id, ProgressTracker};
use crate::{Result, Season};

#[derive(Debug, Serialize)]
struct ProgressSummary {
    season: Season,
    path: String,
    exists: bool,
    processed: usize,
    failed: usize,
    excluded: Vec<String>,
    updated_at: Option<String>,
}

pub fn handle_progress_show(ctx: &CommandContext, seasons: &[Season], as_json: bool) -> Result<()> {
    let seasons = ctx.resolve_seasons(seasons)?;
    let policy = ctx.settings.collection.progress_policy();

    let mut summaries = Vec::with_capacity(seasons.len());
    for season in seasons {
        let path = ctx.settings.checkpoint_path(season);
        let exists = path.exists();
        let tracker = ProgressTracker::load(&path, &run_id(season), false, policy)?;
        let record = tracker.record();
        summaries.push(ProgressSummary {
            season,
            path: path.display().to_string(),
            exists,
            processed: record.processed.len(),
            failed: record.failed.len(),
            excluded: tracker.excluded(),
            updated_at: exists.then(|| record.updated_at.to_rfc3339()),
        });
    }

    if as_json {
        return print_json(&summaries);
    }
    for s in &summaries {
        if !s.exists {
            println!("Season {}: no checkpoint", s.season);
            continue;
        }
        println!(
            "Season {}: {} processed, {} failed ({} excluded), saved {}",
            s.season,
            s.processed,
            s.failed,
            s.excluded.len(),
            s.updated_at.as_deref().unwrap_or("-")
        );
        println!("  {}", s.path);
    }
    Ok(())
}

pub fn handle_progress_reset(ctx: &CommandContext, seasons: &[Season]) -> Result<()> {
    for season in ctx.resolve_seasons(seasons)? {
        let path = ctx.settings.checkpoint_path(season);
        if ProgressTracker::remove(&path)? {
            println!("✓ Season {}: checkpoint removed", season);
        } else {
            println!("Season {}: no checkpoint", season);
        }
    }
    Ok(())
}
