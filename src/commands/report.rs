//! Text rendering of season and verification reports.

use crate::pipeline::{SeasonReport, VerificationReport};
use crate::season::Category;

pub fn print_season_report(report: &SeasonReport) {
    let note = if report.skipped {
        " (already complete, nothing fetched)"
    } else {
        ""
    };
    println!("Season {}: {}{}", report.season, report.state.as_str(), note);
    if let Some(cause) = &report.cause {
        println!("  cause: {}", cause);
    }
    println!(
        "  expected {}, collected {}, missing {}",
        report.expected, report.collected, report.missing
    );

    let s = &report.stats;
    if !report.skipped {
        println!(
            "  games: {} new, {} updated, {} unchanged; stats: {} new, {} updated, {} unchanged",
            s.games_inserted,
            s.games_updated,
            s.games_unchanged,
            s.stats_inserted,
            s.stats_updated,
            s.stats_unchanged
        );
        if s.malformed > 0 || s.fetch_failures > 0 || s.reclassified > 0 {
            println!(
                "  {} malformed records skipped, {} fetch failures, {} games reclassified",
                s.malformed, s.fetch_failures, s.reclassified
            );
        }
    }
    if !report.pending_failures.is_empty() {
        println!("  {} records will be retried next run", report.pending_failures.len());
    }
    if !report.excluded.is_empty() {
        println!("  {} records excluded after repeated failures:", report.excluded.len());
        for uid in &report.excluded {
            println!("    {}", uid);
        }
    }
    if let Some(verification) = &report.verification {
        print_breakdown(verification);
    }
}

pub fn print_verification(report: &VerificationReport) {
    let c = &report.completeness;
    let status = if report.is_complete() {
        "complete"
    } else {
        "incomplete"
    };
    println!("Season {}: {}", report.season, status);
    println!(
        "  expected {}, collected {}, missing {}",
        c.expected_total, c.collected_total, c.missing_total
    );
    print_breakdown(report);
}

fn print_breakdown(report: &VerificationReport) {
    let c = &report.completeness;
    for category in std::iter::once(Category::Regular).chain(Category::PLAYOFF_ROUNDS) {
        if let Some(count) = c.by_category.get(&category) {
            println!(
                "  {:<11} {:>4}/{:<4} missing {}",
                category.as_str(),
                count.actual,
                count.expected,
                count.missing
            );
        }
    }
    println!(
        "  {:<11} {:>4}/{:<4} missing {}",
        "playoffs", c.playoffs.actual, c.playoffs.expected, c.playoffs.missing
    );

    if report.consistency.is_empty() {
        println!("  issues: none");
    } else {
        println!("  issues: {}", report.consistency.len());
        for issue in &report.consistency {
            println!("    - {}", issue);
        }
    }
}
