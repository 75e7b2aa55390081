//! CEP lookup gateway.
//!
//! Resolves Brazilian postal codes through the ViaCEP API and keeps answering
//! when the upstream is slow or down.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /infocep/{cep}
//!  ──────────────────────▶ ┌────────┐    ┌──────────────┐    ┌─────────────────┐
//!                          │  http  │───▶│ LookupGateway│───▶│ ResilientClient │
//!  ◀────────────────────── │ server │◀───│              │◀───│                 │
//!   200 AddressRecord      └────────┘    └──────────────┘    └───┬─────────┬───┘
//!                                                                │         │
//!                                               ┌────────────────▼──┐  ┌───▼──────────┐
//!                                               │  CircuitBreaker   │  │ ViaCepSource │──▶ viacep.com.br
//!                                               │ closed/open/half  │  └──────────────┘
//!                                               └───────────────────┘
//!                                     on any failure → fallback record
//! ```
//!
//! Usage: `cep-gateway [config.toml]`. Without a path, defaults are used.

use std::path::PathBuf;

use cep_gateway::config::{load_config, GatewayConfig};
use cep_gateway::lifecycle;
use cep_gateway::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_config(&path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("cep-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
