//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience + probe produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Terminal / log aggregation
//!     → Prometheus text rendered by the CLI on request
//! ```
//!
//! # Design Decisions
//! - The resilience helpers log but never swallow errors
//! - Metrics are cheap (facade calls are no-ops without a recorder)

pub mod logging;
pub mod metrics;
