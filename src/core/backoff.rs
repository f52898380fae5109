//! Exponential backoff for source requests.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::source::SourceError;

/// Attempt bound plus a doubling delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt number `attempt` (1-based):
    /// `base * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Why a retried operation produced no value
#[derive(Debug, Clone, PartialEq)]
pub enum RetryFailure {
    /// The source answered that the record does not exist.
    NotFound,
    /// Every attempt failed; carries the last error.
    Exhausted { attempts: u32, last: SourceError },
    Cancelled,
}

/// Run `operation` until it succeeds, the policy is exhausted, or `cancel`
/// fires. `NotFound` is never retried; a rate limit waits for the source's
/// `Retry-After` when it gave one.
pub async fn retry_with_backoff<T, F, Fut>(
    operation_name: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryFailure::Cancelled);
        }
        attempt += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation = operation_name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(SourceError::NotFound) => return Err(RetryFailure::NotFound),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            tracing::warn!(
                operation = operation_name,
                attempt,
                error = %err,
                "giving up after max attempts"
            );
            return Err(RetryFailure::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        let delay = match &err {
            SourceError::RateLimited {
                retry_after: Some(wait),
            } => *wait,
            _ => policy.delay_for(attempt),
        };
        tracing::warn!(
            operation = operation_name,
            attempt,
            error = %err,
            backoff_ms = delay.as_millis() as u64,
            "request failed, will retry after backoff"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(RetryFailure::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
