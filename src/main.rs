//! Entry point: parse CLI, set up logging and cancellation, dispatch to
//! command handlers.

use std::process::ExitCode;

use clap::Parser;
use nfl_collect::{
    cli::{Cli, Commands, ProgressCmd},
    commands::{
        collect::{handle_collect, CollectParams},
        common::CommandContext,
        progress::{handle_progress_reset, handle_progress_show},
        reclassify::{handle_reclassify, handle_set_category},
        supervise::{handle_supervise, SuperviseParams},
        verify::handle_verify,
    },
    CollectError,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for a run stopped by Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nfl_collect={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current record");
            on_signal.cancel();
        }
    });

    let ctx = CommandContext::new(cli.config.as_deref(), cli.db.as_deref())?;

    let result = match cli.command {
        Commands::Collect {
            seasons,
            force_refresh,
            reset_progress,
            schedule_url,
            stats_url,
            json,
        } => {
            handle_collect(
                &ctx,
                CollectParams {
                    seasons: seasons.seasons,
                    force_refresh,
                    reset_progress,
                    schedule_url,
                    stats_url,
                    as_json: json,
                },
                cancel.clone(),
            )
            .await
        }

        Commands::Verify { seasons, json } => handle_verify(&ctx, &seasons.seasons, json),

        Commands::Reclassify {
            seasons,
            dry_run,
            json,
        } => handle_reclassify(&ctx, &seasons.seasons, dry_run, json).map(|_| true),

        Commands::SetCategory { game, category } => {
            handle_set_category(&ctx, &game, category).map(|_| true)
        }

        Commands::Supervise {
            seasons,
            force_refresh,
            max_restarts,
            attempt_timeout,
        } => handle_supervise(
            &ctx,
            SuperviseParams {
                seasons: seasons.seasons,
                force_refresh,
                max_restarts,
                attempt_timeout_secs: attempt_timeout,
                verbose: cli.verbose,
            },
            cancel.clone(),
        )
        .await
        .map(|outcome| outcome.is_success()),

        Commands::Progress { cmd } => match cmd {
            ProgressCmd::Show { seasons, json } => {
                handle_progress_show(&ctx, &seasons.seasons, json).map(|_| true)
            }
            ProgressCmd::Reset { seasons } => {
                handle_progress_reset(&ctx, &seasons.seasons).map(|_| true)
            }
        },
    };

    if cancel.is_cancelled() {
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(CollectError::Cancelled) => Ok(ExitCode::from(EXIT_CANCELLED)),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            error!(error = %e, "command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
