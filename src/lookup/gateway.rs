//! Lookup gateway: the entry point handlers call.

use std::sync::Arc;

use crate::lookup::client::ResilientClient;
use crate::lookup::record::{AddressRecord, PostalCode};
use crate::resilience::BreakerSnapshot;

/// Stateless front for the resilient client.
#[derive(Debug, Clone)]
pub struct LookupGateway {
    client: Arc<ResilientClient>,
}

impl LookupGateway {
    pub fn new(client: ResilientClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Resolve `code` to an address. Never fails: a degraded upstream yields
    /// the fallback record.
    pub async fn resolve(&self, code: &PostalCode) -> AddressRecord {
        tracing::debug!(cep = %code, "Resolving postal code");
        self.client.fetch(code).await
    }

    /// Current breaker view, for status reporting.
    pub fn breaker(&self) -> BreakerSnapshot {
        self.client.breaker()
    }
}
