//! Supervise command: re-runs `collect` in a child process until it exits
//! cleanly.

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::common::CommandContext;
use crate::error::CollectError;
use crate::pipeline::{Supervisor, SupervisorOutcome};
use crate::{Result, Season};

pub struct SuperviseParams {
    pub seasons: Vec<Season>,
    pub force_refresh: bool,
    pub max_restarts: Option<u32>,
    pub attempt_timeout_secs: Option<u64>,
    pub verbose: u8,
}

/// Arguments for one `collect` attempt. Only the first attempt refetches
/// everything; restarts resume from the checkpoint.
pub fn collect_args(ctx: &CommandContext, params: &SuperviseParams, attempt: u32) -> Vec<String> {
    let mut args = vec!["collect".to_string()];
    for season in &params.seasons {
        args.push("--season".to_string());
        args.push(season.to_string());
    }
    if params.force_refresh && attempt == 1 {
        args.push("--force-refresh".to_string());
    }
    if let Some(config) = &ctx.config_path {
        args.push("--config".to_string());
        args.push(config.display().to_string());
    }
    args.push("--db".to_string());
    args.push(ctx.db_path.display().to_string());
    if params.verbose > 0 {
        args.push(format!("-{}", "v".repeat(params.verbose as usize)));
    }
    args
}

pub async fn handle_supervise(
    ctx: &CommandContext,
    params: SuperviseParams,
    cancel: CancellationToken,
) -> Result<SupervisorOutcome> {
    // Unknown seasons fail here rather than in every child.
    ctx.resolve_seasons(&params.seasons)?;
    let exe = std::env::current_exe()?;

    let mut settings = ctx.settings.supervisor.clone();
    if let Some(max_restarts) = params.max_restarts {
        settings.max_restarts = max_restarts;
    }
    if params.attempt_timeout_secs.is_some() {
        settings.attempt_timeout_secs = params.attempt_timeout_secs;
    }
    let supervisor = Supervisor::new(settings.retry_policy(), settings.attempt_timeout());

    let outcome = supervisor
        .run(&cancel, |attempt| {
            let args = collect_args(ctx, &params, attempt);
            let exe = exe.clone();
            async move {
                debug!(attempt, ?args, "spawning collector");
                let status = Command::new(&exe)
                    .args(&args)
                    .kill_on_drop(true)
                    .status()
                    .await?;
                if status.success() {
                    Ok(())
                } else {
                    Err(CollectError::ProcessExit {
                        status: status.to_string(),
                    })
                }
            }
        })
        .await;

    match &outcome {
        SupervisorOutcome::Succeeded { attempts } => {
            println!("✓ Collection finished after {} attempt(s)", attempts)
        }
        SupervisorOutcome::GaveUp {
            attempts,
            last_error,
        } => println!("✗ Gave up after {} attempts: {}", attempts, last_error),
        SupervisorOutcome::Cancelled { attempts } => {
            println!("Cancelled during attempt {}", attempts)
        }
    }
    Ok(outcome)
}
