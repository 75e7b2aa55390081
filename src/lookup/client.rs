//! Resilient upstream client.
//!
//! # Data Flow
//! ```text
//! fetch(code)
//!     → breaker.try_acquire()          (None → fallback, BreakerOpen)
//!     → spawned attempt:
//!         source.lookup(code) under a deadline
//!         permit.report(outcome)
//!     → Ok(record) → record
//!     → Err(cause) → fallback::produce(code, cause)
//! ```
//!
//! # Design Decisions
//! - The attempt runs in its own task: a caller that goes away does not stop
//!   the outcome from being reported
//! - The deadline is applied here as well as in the HTTP client, so any
//!   [`AddressSource`] that hangs is treated as a timeout
//! - A panic inside the attempt is a bug and is resumed on the caller

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::GatewayConfig;
use crate::lookup::error::{FailureCause, SetupError};
use crate::lookup::fallback;
use crate::lookup::record::{AddressRecord, PostalCode};
use crate::lookup::upstream::{AddressSource, ViaCepSource};
use crate::observability::metrics;
use crate::resilience::{BreakerSnapshot, CircuitBreaker, Outcome};

/// Client that always yields an address: the upstream's, or the fallback.
pub struct ResilientClient {
    source: Arc<dyn AddressSource>,
    breaker: Arc<CircuitBreaker>,
    call_timeout: Duration,
}

impl ResilientClient {
    pub fn new(
        source: Arc<dyn AddressSource>,
        breaker: CircuitBreaker,
        call_timeout: Duration,
    ) -> Self {
        Self {
            source,
            breaker: Arc::new(breaker),
            call_timeout,
        }
    }

    /// Build the ViaCEP-backed client described by `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, SetupError> {
        let source = ViaCepSource::new(&config.upstream)?;
        let breaker = CircuitBreaker::new("viacep", config.breaker.clone());
        Ok(Self::new(
            Arc::new(source),
            breaker,
            config.upstream.request_timeout(),
        ))
    }

    pub fn breaker(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Resolve `code`, never failing.
    pub async fn fetch(&self, code: &PostalCode) -> AddressRecord {
        let Some(permit) = self.breaker.try_acquire() else {
            tracing::debug!(cep = %code, breaker = self.breaker.name(), "Short-circuited");
            metrics::record_lookup("short_circuited");
            return fallback::produce(code, &FailureCause::BreakerOpen);
        };

        let source = Arc::clone(&self.source);
        let deadline = self.call_timeout;
        let target = code.clone();
        let attempt = tokio::spawn(async move {
            let start = Instant::now();
            let result = match tokio::time::timeout(deadline, source.lookup(&target)).await {
                Ok(result) => result,
                Err(_) => Err(FailureCause::Timeout),
            };
            metrics::record_upstream_duration(start);
            permit.report(match result {
                Ok(_) => Outcome::Success,
                Err(_) => Outcome::Failure,
            });
            result
        });

        let result = match attempt.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(FailureCause::NetworkUnreachable(
                "lookup task cancelled".to_string(),
            )),
        };

        match result {
            Ok(record) => {
                tracing::debug!(cep = %code, "Upstream lookup succeeded");
                metrics::record_lookup("success");
                record
            }
            Err(cause) => {
                tracing::info!(cep = %code, cause = cause.kind(), "Upstream lookup failed");
                metrics::record_lookup(cause.kind());
                fallback::produce(code, &cause)
            }
        }
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("breaker", &self.breaker.name())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
