//! Failure taxonomy for resilient invocations.

use std::time::Duration;
use thiserror::Error;

/// Message used when a deadline fires and the caller supplied none.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "Operation timed out";

/// Errors surfaced by the resilience combinators.
///
/// A timeout is just another failure once it is fed into retry accounting,
/// so callers composing `retry_with_timeout` see either variant as the
/// final error depending on how the last attempt ended.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The wrapped operation failed.
    #[error("{0}")]
    Operation(E),

    /// The deadline elapsed before the operation settled.
    #[error("{message}")]
    Timeout { message: String, after: Duration },

    /// The retry policy cannot run a single attempt.
    #[error("invalid retry configuration: {0}")]
    InvalidConfig(String),
}

impl<E> ResilienceError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResilienceError::Timeout { .. })
    }

    /// Borrow the operation's own error, if this is one.
    pub fn operation(&self) -> Option<&E> {
        match self {
            ResilienceError::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// Unwrap the operation's own error, handing back `self` otherwise.
    pub fn into_operation(self) -> Result<E, Self> {
        match self {
            ResilienceError::Operation(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Result type for resilient invocations.
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: ResilienceError<String> = ResilienceError::Operation("boom".to_string());
        assert_eq!(err.to_string(), "boom");

        let err: ResilienceError<String> = ResilienceError::Timeout {
            message: "too slow".to_string(),
            after: Duration::from_millis(100),
        };
        assert_eq!(err.to_string(), "too slow");
        assert!(err.is_timeout());

        let err: ResilienceError<String> =
            ResilienceError::InvalidConfig("max_attempts must be at least 1".to_string());
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_into_operation() {
        let err: ResilienceError<u8> = ResilienceError::Operation(7);
        assert_eq!(err.operation(), Some(&7));
        assert_eq!(err.into_operation().ok(), Some(7));

        let err: ResilienceError<u8> = ResilienceError::Timeout {
            message: DEFAULT_TIMEOUT_MESSAGE.to_string(),
            after: Duration::from_secs(1),
        };
        assert!(err.into_operation().is_err());
    }
}
