//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_lookups_total` (counter): lookups by outcome (`success`,
//!   `short_circuited`, or the failure cause)
//! - `cep_upstream_duration_seconds` (histogram): upstream attempt latency
//! - `cep_breaker_transitions_total` (counter): breaker transitions by from/to
//! - `cep_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `cep_http_requests_total` (counter): inbound requests by status
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("cep_lookups_total", "Postal-code lookups by outcome");
    describe_histogram!(
        "cep_upstream_duration_seconds",
        "Upstream lookup latency in seconds"
    );
    describe_counter!(
        "cep_breaker_transitions_total",
        "Circuit breaker state transitions"
    );
    describe_gauge!(
        "cep_breaker_state",
        "Circuit breaker state (0=closed, 1=half-open, 2=open)"
    );
    describe_counter!("cep_http_requests_total", "Inbound HTTP requests by status");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_lookup(outcome: &'static str) {
    counter!("cep_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_upstream_duration(start: Instant) {
    histogram!("cep_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_breaker_transition(breaker: &'static str, from: CircuitState, to: CircuitState) {
    counter!(
        "cep_breaker_transitions_total",
        "breaker" => breaker,
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);

    record_breaker_state(breaker, to);
}

/// Publish the current state of `breaker` on the state gauge.
pub fn record_breaker_state(breaker: &'static str, state: CircuitState) {
    let level = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    gauge!("cep_breaker_state", "breaker" => breaker).set(level);
}

pub fn record_http_request(status: u16, start: Instant) {
    counter!("cep_http_requests_total", "status" => status.to_string()).increment(1);
    tracing::trace!(status, elapsed_ms = start.elapsed().as_millis() as u64, "Request completed");
}
