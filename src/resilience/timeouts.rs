//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an operation against a deadline
//! - Turn an elapsed deadline into a `ResilienceError::Timeout`
//! - Release the timer on both paths
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `with_timeout` drops the losing future, which cancels it
//! - `with_timeout_detached` races a spawned task and only discards its
//!   result, leaving the task running

use std::future::Future;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::resilience::error::{ResilienceError, ResilienceResult, DEFAULT_TIMEOUT_MESSAGE};

/// Default per-attempt deadline for `retry_with_timeout`.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// A per-attempt deadline and the message reported when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadline {
    pub timeout: Duration,
    pub message: String,
}

impl Deadline {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            message: DEFAULT_TIMEOUT_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Race `future` against this deadline.
    pub async fn run<F, T, E>(&self, future: F) -> ResilienceResult<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        with_timeout(future, self.timeout, self.message.as_str()).await
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPT_TIMEOUT)
    }
}

impl From<&TimeoutConfig> for Deadline {
    fn from(config: &TimeoutConfig) -> Self {
        Self::new(Duration::from_millis(config.attempt_timeout_ms)).with_message(config.message.clone())
    }
}

/// Race `future` against a timer of `timeout`.
///
/// Whichever settles first decides the outcome. If the timer wins, the
/// future is dropped and the result is a timeout carrying `message`.
pub async fn with_timeout<F, T, E>(
    future: F,
    timeout: Duration,
    message: impl Into<String>,
) -> ResilienceResult<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result.map_err(ResilienceError::Operation),
        Err(_) => Err(timed_out(timeout, message.into())),
    }
}

/// Race an already spawned task against a timer of `timeout`.
///
/// On timeout the handle is dropped, which detaches the task: it keeps
/// running to completion and its result is discarded. A panicked or
/// aborted task is reported through `E: From<JoinError>`.
pub async fn with_timeout_detached<T, E>(
    handle: JoinHandle<Result<T, E>>,
    timeout: Duration,
    message: impl Into<String>,
) -> ResilienceResult<T, E>
where
    E: From<JoinError>,
{
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result.map_err(ResilienceError::Operation),
        Ok(Err(join_err)) => Err(ResilienceError::Operation(E::from(join_err))),
        Err(_) => Err(timed_out(timeout, message.into())),
    }
}

fn timed_out<E>(after: Duration, message: String) -> ResilienceError<E> {
    tracing::warn!(timeout = ?after, message = %message, "Deadline elapsed before operation settled");
    metrics::record_timeout();
    ResilienceError::Timeout { message, after }
}
