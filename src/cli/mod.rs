//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use types::{GameUid, Season};

use crate::season::Category;

/// Seasons to operate on
#[derive(Debug, Clone, Args)]
pub struct SeasonArgs {
    /// Season year (repeatable): `-s 2023 -s 2024`. Defaults to every registered season.
    #[clap(long = "season", short = 's')]
    pub seasons: Vec<Season>,
}

#[derive(Debug, Subcommand)]
pub enum ProgressCmd {
    /// Show checkpointed progress per season.
    Show {
        #[clap(flatten)]
        seasons: SeasonArgs,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Delete checkpoints so the next run starts from scratch.
    Reset {
        #[clap(flatten)]
        seasons: SeasonArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect schedules and team stats, then verify each season.
    Collect {
        #[clap(flatten)]
        seasons: SeasonArgs,

        /// Ignore the pre-flight completeness check and refetch processed records.
        #[clap(long)]
        force_refresh: bool,

        /// Discard checkpoints before collecting.
        #[clap(long)]
        reset_progress: bool,

        /// Schedule feed URL (overrides `[sources] schedule_url`).
        #[clap(long, env = "NFL_COLLECT_SCHEDULE_URL")]
        schedule_url: Option<String>,

        /// Team stats feed URL (overrides `[sources] stats_url`).
        #[clap(long, env = "NFL_COLLECT_STATS_URL")]
        stats_url: Option<String>,

        /// Output reports as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Report completeness and consistency of stored seasons without changing them.
    Verify {
        #[clap(flatten)]
        seasons: SeasonArgs,

        /// Output reports as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Assign playoff rounds to games that were never categorized.
    Reclassify {
        #[clap(flatten)]
        seasons: SeasonArgs,

        /// Show what would change without writing.
        #[clap(long)]
        dry_run: bool,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Confirm a game's category by hand; reclassification will leave it alone.
    SetCategory {
        /// Game uid.
        game: GameUid,

        /// regular, wildcard, divisional, conference or superbowl.
        category: Category,
    },

    /// Run `collect` in a child process, restarting it on failure or timeout.
    Supervise {
        #[clap(flatten)]
        seasons: SeasonArgs,

        /// Passed through to each collect attempt.
        #[clap(long)]
        force_refresh: bool,

        /// Restarts after the first attempt (overrides `[supervisor] max_restarts`).
        #[clap(long)]
        max_restarts: Option<u32>,

        /// Kill an attempt running longer than this many seconds.
        #[clap(long)]
        attempt_timeout: Option<u64>,
    },

    /// Inspect or reset resume checkpoints.
    Progress {
        #[clap(subcommand)]
        cmd: ProgressCmd,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "nfl-collect",
    about = "Collect and verify NFL season schedules and team statistics"
)]
pub struct Cli {
    /// Settings file (or set `NFL_COLLECT_CONFIG`).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (default: `<data dir>/nfl.db`).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// More log output: `-v` debug, `-vv` trace. `RUST_LOG` takes precedence.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Commands,
}
