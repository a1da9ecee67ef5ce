//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field has a default so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Retry and backoff settings.
    pub retries: RetryConfig,

    /// Per-attempt deadline settings.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// HTTP probe settings.
    pub probe: ProbeConfig,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included.
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds; doubles on each retry.
    pub initial_delay_ms: u64,

    /// Optional cap on the exponential part of the delay in milliseconds.
    pub max_delay_ms: Option<u64>,

    /// Upper bound (exclusive) of the random jitter added to every delay.
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: None,
            jitter_ms: 1000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Message carried by the error when the deadline fires.
    pub message: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 15_000,
            message: "Operation timed out".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the Prometheus recorder and print metrics after a probe.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}

/// HTTP probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Headers sent with every probe request (e.g. an API key).
    pub headers: BTreeMap<String, String>,

    /// User-Agent header value.
    pub user_agent: String,

    /// Honor HTTP(S)_PROXY from the environment.
    pub use_system_proxy: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            user_agent: concat!("resilient-fetch/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResilienceConfig::default();
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.retries.initial_delay_ms, 1000);
        assert_eq!(config.retries.jitter_ms, 1000);
        assert_eq!(config.retries.max_delay_ms, None);
        assert_eq!(config.timeouts.attempt_timeout_ms, 15_000);
        assert_eq!(config.timeouts.message, "Operation timed out");
        assert!(!config.observability.metrics_enabled);
        assert!(config.probe.user_agent.starts_with("resilient-fetch/"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ResilienceConfig = toml::from_str(
            r#"
            [retries]
            max_attempts = 5

            [probe.headers]
            apikey = "anon"
            "#,
        )
        .unwrap();

        assert_eq!(config.retries.max_attempts, 5);
        assert_eq!(config.retries.initial_delay_ms, 1000);
        assert_eq!(config.timeouts, TimeoutConfig::default());
        assert_eq!(config.probe.headers.get("apikey").map(String::as_str), Some("anon"));
    }
}
