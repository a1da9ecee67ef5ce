//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, timeouts > 0, cap >= initial delay)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResilienceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ResilienceConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `retries.max_attempts`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ResilienceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new(
            "retries.max_attempts",
            "must be at least 1",
        ));
    }
    if let Some(max) = retries.max_delay_ms {
        if max < retries.initial_delay_ms {
            errors.push(ValidationError::new(
                "retries.max_delay_ms",
                format!(
                    "must not be smaller than initial_delay_ms ({} < {})",
                    max, retries.initial_delay_ms
                ),
            ));
        }
    }

    if config.timeouts.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "timeouts.attempt_timeout_ms",
            "must be greater than 0",
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    for name in config.probe.headers.keys() {
        if name.trim().is_empty() {
            errors.push(ValidationError::new("probe.headers", "header name is empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ResilienceConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ResilienceConfig::default();
        config.retries.max_attempts = 0;
        config.retries.max_delay_ms = Some(10);
        config.timeouts.attempt_timeout_ms = 0;
        config.observability.log_level = "loud".to_string();
        config.probe.headers.insert(" ".to_string(), "x".to_string());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "retries.max_attempts",
                "retries.max_delay_ms",
                "timeouts.attempt_timeout_ms",
                "observability.log_level",
                "probe.headers",
            ]
        );
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = ResilienceConfig::default();
        config.observability.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
