//! Postal-code lookup gateway with circuit-breaker protection.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lookup;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use lookup::{AddressRecord, LookupGateway, PostalCode};
