//! Restart Supervisor: a bounded retry loop around a whole collection
//! attempt.
//!
//! The supervised job is opaque. An attempt fails when it returns an error
//! or outlives `attempt_timeout`; the supervisor then cools down and starts
//! another, until one succeeds, the policy gives up, or the token is
//! cancelled. Work already done survives through the progress checkpoint, so
//! every restart resumes rather than repeats.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::backoff::RetryPolicy;
use crate::error::CollectError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SupervisorOutcome {
    Succeeded { attempts: u32 },
    GaveUp { attempts: u32, last_error: String },
    Cancelled { attempts: u32 },
}

impl SupervisorOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SupervisorOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Supervisor {
    /// `max_attempts` counts the first run plus every restart.
    pub policy: RetryPolicy,
    pub attempt_timeout: Option<Duration>,
}

impl Supervisor {
    pub fn new(policy: RetryPolicy, attempt_timeout: Option<Duration>) -> Self {
        Self {
            policy,
            attempt_timeout,
        }
    }

    /// Run `job` (called with the 1-based attempt number) until it succeeds.
    ///
    /// Cancellation drops the in-flight attempt immediately and never
    /// restarts.
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, mut job: F) -> SupervisorOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return SupervisorOutcome::Cancelled { attempts: attempt };
            }
            attempt += 1;
            info!(attempt, max_attempts, "starting collection attempt");

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(attempt, "cancelled, not restarting");
                    return SupervisorOutcome::Cancelled { attempts: attempt };
                }
                result = self.attempt(attempt, job(attempt)) => result,
            };

            let err = match result {
                Ok(()) => {
                    info!(attempt, "collection attempt succeeded");
                    return SupervisorOutcome::Succeeded { attempts: attempt };
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                error!(attempt, error = %err, "restart limit reached, giving up");
                return SupervisorOutcome::GaveUp {
                    attempts: attempt,
                    last_error: err.to_string(),
                };
            }

            let cooldown = self.policy.delay_for(attempt);
            warn!(
                attempt,
                error = %err,
                cooldown_ms = cooldown.as_millis() as u64,
                "collection attempt failed, restarting after cool-down"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    return SupervisorOutcome::Cancelled { attempts: attempt };
                }
                _ = tokio::time::sleep(cooldown) => {}
            }
        }
    }

    async fn attempt<Fut>(&self, attempt: u32, job: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        match self.attempt_timeout {
            None => job.await,
            Some(limit) => match tokio::time::timeout(limit, job).await {
                Ok(result) => result,
                Err(_) => Err(CollectError::ProcessTimeout {
                    attempt,
                    timeout_secs: limit.as_secs(),
                }),
            },
        }
    }
}
