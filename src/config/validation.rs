//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream origin is a bare http(s) origin
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check header overrides are legal header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::upstream::Upstream;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Upstream::parse(&config.upstream.base_url) {
        errors.push(ValidationError::new("upstream.base_url", e.to_string()));
    }

    let headers = [
        ("upstream.user_agent", &config.upstream.user_agent),
        ("upstream.accept", &config.upstream.accept),
        ("upstream.accept_language", &config.upstream.accept_language),
    ];
    for (field, value) in headers {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(field, "not a valid header value"));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
