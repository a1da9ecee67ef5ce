//! Retry logic.
//!
//! # Responsibilities
//! - Re-invoke a failing operation up to `max_attempts` times
//! - Sleep an exponentially growing, jittered delay between attempts
//! - Surface the last failure once attempts are exhausted
//!
//! # Design Decisions
//! - Attempts are strictly sequential; attempt `n + 1` starts only after
//!   attempt `n` settled and its delay elapsed
//! - Each call owns its counter and timers; no state is shared across calls
//! - A timed out attempt consumes a slot like any other failure
//! - `max_attempts == 0` is rejected before anything runs

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::error::{ResilienceError, ResilienceResult};
use crate::resilience::timeouts::Deadline;

/// Default number of attempts, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::new(initial_delay),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        let mut backoff = Backoff::new(Duration::from_millis(config.initial_delay_ms))
            .with_jitter(Duration::from_millis(config.jitter_ms));
        if let Some(max_ms) = config.max_delay_ms {
            backoff = backoff.with_max(Duration::from_millis(max_ms));
        }
        Self {
            max_attempts: config.max_attempts,
            backoff,
        }
    }
}

/// Invoke `operation` until it succeeds or `policy.max_attempts` is reached.
///
/// On exhaustion the error of the final attempt is returned, not the first.
pub async fn retry<T, E, Fut, Op>(policy: &RetryPolicy, mut operation: Op) -> ResilienceResult<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    run_attempts(policy, || {
        let attempt = operation();
        async move { attempt.await.map_err(ResilienceError::Operation) }
    })
    .await
}

/// Like [`retry`], but every attempt races its own fresh `deadline`.
pub async fn retry_with_timeout<T, E, Fut, Factory>(
    policy: &RetryPolicy,
    deadline: &Deadline,
    mut factory: Factory,
) -> ResilienceResult<T, E>
where
    Factory: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    run_attempts(policy, || deadline.run(factory())).await
}

async fn run_attempts<T, E, Fut, Op>(policy: &RetryPolicy, mut attempt: Op) -> ResilienceResult<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = ResilienceResult<T, E>>,
    E: Display,
{
    policy.validate().map_err(ResilienceError::InvalidConfig)?;

    let mut failures = 0u32;
    loop {
        match attempt().await {
            Ok(value) => {
                metrics::record_attempt("success");
                if failures > 0 {
                    tracing::debug!(attempts = failures + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                metrics::record_attempt(if err.is_timeout() { "timeout" } else { "failure" });
                failures += 1;

                if failures >= policy.max_attempts {
                    tracing::warn!(attempts = failures, error = %err, "Retries exhausted");
                    metrics::record_retries_exhausted();
                    return Err(err);
                }

                let delay = policy.backoff.delay(failures);
                tracing::debug!(
                    attempt = failures,
                    max_attempts = policy.max_attempts,
                    delay = ?delay,
                    error = %err,
                    "Attempt failed, retrying"
                );
                metrics::record_backoff(delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
