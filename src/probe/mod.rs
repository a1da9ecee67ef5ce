//! HTTP probe.
//!
//! # Responsibilities
//! - Issue a GET against a REST endpoint with configured headers
//! - Treat transport errors and non-2xx statuses as attempt failures
//! - Run every attempt through `retry_with_timeout`
//! - Report status, attempt count and latency
//!
//! # Design Decisions
//! - Every attempt gets its own `x-request-id` (UUID v4) for correlation
//! - Reading the body is part of the attempt, so the deadline covers it

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::resilience::{retry_with_timeout, Deadline, ResilienceResult, RetryPolicy};

/// Header carrying the per-attempt correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors that can occur while probing an endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header '{0}', expected name:value")]
    InvalidHeader(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with status {status}")]
    Status { status: u16 },
}

/// A GET request to probe.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

impl ProbeRequest {
    /// Parse `url`; only http and https are accepted.
    pub fn new(url: &str) -> Result<Self, ProbeError> {
        let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            url: parsed,
            headers: HeaderMap::new(),
        })
    }

    /// Build a request carrying the headers from `config`.
    pub fn from_config(url: &str, config: &ProbeConfig) -> Result<Self, ProbeError> {
        let mut request = Self::new(url)?;
        for (name, value) in &config.headers {
            request = request.with_header(name, value)?;
        }
        Ok(request)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ProbeError> {
        let invalid = || ProbeError::InvalidHeader(format!("{name}:{value}"));
        let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add a header given in `name:value` form.
    pub fn with_raw_header(self, raw: &str) -> Result<Self, ProbeError> {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| ProbeError::InvalidHeader(raw.to_string()))?;
        self.with_header(name, value)
    }
}

/// Outcome of a successful probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub status: u16,
    pub attempts: u32,
    pub elapsed_ms: u64,
    pub body_bytes: usize,
    pub request_id: Uuid,
}

/// Build the HTTP client used for probing.
pub fn build_client(config: &ProbeConfig) -> Result<Client, ProbeError> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// GET `request.url` until it answers 2xx or the policy gives up.
pub async fn probe(
    client: &Client,
    request: &ProbeRequest,
    policy: &RetryPolicy,
    deadline: &Deadline,
) -> ResilienceResult<ProbeReport, ProbeError> {
    let start = Instant::now();
    let mut attempts = 0u32;

    let (status, body_bytes, request_id) = retry_with_timeout(policy, deadline, || {
        attempts += 1;
        let attempt = attempts;
        let request_id = Uuid::new_v4();
        let builder = client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .header(REQUEST_ID_HEADER, request_id.to_string());

        async move {
            tracing::debug!(request_id = %request_id, attempt, "Sending probe request");
            let response = builder.send().await?;
            let status = response.status();
            metrics::record_probe_response(status.as_u16());

            if !status.is_success() {
                tracing::debug!(
                    request_id = %request_id,
                    attempt,
                    status = status.as_u16(),
                    "Probe answered with error status"
                );
                return Err(ProbeError::Status {
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await?;
            Ok((status.as_u16(), body.len(), request_id))
        }
    })
    .await?;

    let report = ProbeReport {
        url: request.url.to_string(),
        status,
        attempts,
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        body_bytes,
        request_id,
    };
    tracing::info!(
        url = %report.url,
        status = report.status,
        attempts = report.attempts,
        elapsed_ms = report.elapsed_ms,
        "Probe succeeded"
    );
    Ok(report)
}
