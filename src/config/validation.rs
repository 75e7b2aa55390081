//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and that addresses
//! and URLs parse. All errors are collected, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `breaker.window_size`).
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.cannot_be_a_base() => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{}' cannot be used as a base URL", config.upstream.base_url),
        )),
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::new(
                "upstream.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ))
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{}' is not a valid URL: {}", config.upstream.base_url, e),
        )),
    }

    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_ms", "must be > 0"));
    }
    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.request_timeout_ms", "must be > 0"));
    }

    let breaker = &config.breaker;
    if breaker.window_size == 0 {
        errors.push(ValidationError::new("breaker.window_size", "must be > 0"));
    }
    if breaker.minimum_calls == 0 {
        errors.push(ValidationError::new("breaker.minimum_calls", "must be > 0"));
    } else if breaker.minimum_calls > breaker.window_size {
        errors.push(ValidationError::new(
            "breaker.minimum_calls",
            format!(
                "{} exceeds window_size {}",
                breaker.minimum_calls, breaker.window_size
            ),
        ));
    }
    if !(breaker.failure_rate_threshold > 0.0 && breaker.failure_rate_threshold <= 1.0) {
        errors.push(ValidationError::new(
            "breaker.failure_rate_threshold",
            format!("{} is outside (0, 1]", breaker.failure_rate_threshold),
        ));
    }

    let inbound_ms = config.timeouts.request_secs.saturating_mul(1000);
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    } else if inbound_ms <= config.upstream.request_timeout_ms {
        // The inbound deadline must leave room for the fallback after an upstream timeout.
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "{}s must exceed upstream.request_timeout_ms ({}ms)",
                config.timeouts.request_secs, config.upstream.request_timeout_ms
            ),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
