//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the lookup gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream lookup service settings.
    pub upstream: UpstreamConfig,

    /// Circuit breaker tuning.
    pub breaker: BreakerConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound postal-code validation.
    pub validation: ValidationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream lookup service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the lookup service. Requests go to `{base_url}/ws/{code}/json/`.
    pub base_url: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Total per-call timeout (connect + response + body) in milliseconds.
    pub request_timeout_ms: u64,

    /// User-Agent header sent upstream.
    pub user_agent: String,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://viacep.com.br".to_string(),
            connect_timeout_ms: 2_000,
            request_timeout_ms: 5_000,
            user_agent: concat!("cep-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Circuit breaker configuration.
///
/// The breaker keeps the outcomes of the last `window_size` attempts and opens
/// once at least `minimum_calls` are buffered and the failure ratio reaches
/// `failure_rate_threshold`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Number of most recent outcomes kept in the sliding window.
    pub window_size: usize,

    /// Outcomes required in the window before the ratio is evaluated.
    pub minimum_calls: usize,

    /// Failure ratio in (0, 1] that trips the breaker (e.g., 0.5 for 50%).
    pub failure_rate_threshold: f64,

    /// Time spent in Open before a trial call is allowed, in milliseconds.
    pub open_cooldown_ms: u64,
}

impl BreakerConfig {
    pub fn open_cooldown(&self) -> Duration {
        Duration::from_millis(self.open_cooldown_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            minimum_calls: 5,
            failure_rate_threshold: 0.5,
            open_cooldown_ms: 30_000,
        }
    }
}

/// Inbound timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Inbound validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject codes not shaped like `12345678` or `12345-678` with 400.
    pub strict: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
