//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! retry / retry_with_timeout(policy, operation):
//!     → timeouts.rs (optional: race each attempt against a fresh deadline)
//!     → On failure: backoff.rs (exponential delay + jitter), sleep
//!     → retries.rs (re-invoke until success or max_attempts)
//!     → last failure surfaced as ResilienceError
//! ```
//!
//! # Design Decisions
//! - Pure control-flow combinators over any async operation
//! - A timeout is just another attempt failure when composed with retry
//! - Jittered backoff prevents synchronized retry storms

pub mod backoff;
pub mod error;
pub mod retries;
pub mod timeouts;

pub use backoff::Backoff;
pub use error::{ResilienceError, ResilienceResult, DEFAULT_TIMEOUT_MESSAGE};
pub use retries::{retry, retry_with_timeout, RetryPolicy};
pub use timeouts::{with_timeout, with_timeout_detached, Deadline};
