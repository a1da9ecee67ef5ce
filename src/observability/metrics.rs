//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resilience_attempts_total` (counter): attempts by outcome (success, failure, timeout)
//! - `resilience_retries_exhausted_total` (counter): calls that ran out of attempts
//! - `resilience_timeouts_total` (counter): deadlines that fired
//! - `resilience_backoff_seconds` (histogram): delays slept between attempts
//! - `probe_requests_total` (counter): probe responses by status
//!
//! # Design Decisions
//! - Updates go through the `metrics` facade and are no-ops until a
//!   recorder is installed
//! - The Prometheus recorder is installed on demand and rendered by the caller

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub fn record_attempt(outcome: &'static str) {
    counter!("resilience_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retries_exhausted() {
    counter!("resilience_retries_exhausted_total").increment(1);
}

pub fn record_timeout() {
    counter!("resilience_timeouts_total").increment(1);
}

pub fn record_backoff(delay: Duration) {
    histogram!("resilience_backoff_seconds").record(delay.as_secs_f64());
}

pub fn record_probe_response(status: u16) {
    counter!("probe_requests_total", "status" => status.to_string()).increment(1);
}

/// Install a global Prometheus recorder without an HTTP listener.
///
/// The returned handle renders the text exposition format.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
