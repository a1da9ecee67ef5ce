//! Resilient invocation helpers: bounded retry with jittered exponential
//! backoff, per-attempt deadlines, and an HTTP probe built on both.

pub mod config;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use config::ResilienceConfig;
pub use resilience::{
    retry, retry_with_timeout, with_timeout, Backoff, Deadline, ResilienceError, RetryPolicy,
};
