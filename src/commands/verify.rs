//! Verify command implementation

use super::common::{print_json, CommandContext};
use super::report::print_verification;
use crate::pipeline::verify_season;
use crate::{Result, Season};

/// Returns true when every season is complete.
pub fn handle_verify(ctx: &CommandContext, seasons: &[Season], as_json: bool) -> Result<bool> {
    let seasons = ctx.resolve_seasons(seasons)?;
    let db = ctx.open_db()?;
    let policy = ctx.settings.verification.policy();

    let mut reports = Vec::with_capacity(seasons.len());
    for season in seasons {
        reports.push(verify_season(&db, &ctx.registry, season, &policy)?);
    }

    if as_json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            print_verification(report);
        }
    }
    Ok(reports.iter().all(|r| r.is_complete()))
}
