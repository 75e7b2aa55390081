//! Postal-code lookup subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.rs   resolve(code)
//!     → client.rs    breaker decision + upstream attempt
//!         → upstream.rs   GET {base}/ws/{code}/json/
//!     → fallback.rs  degraded record on any failure
//! ```
//!
//! # Design Decisions
//! - Callers always receive an [`AddressRecord`]; failures never propagate
//! - [`FailureCause`] names why a lookup degraded, for logs and metrics only

pub mod client;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod record;
pub mod upstream;

pub use client::ResilientClient;
pub use error::{FailureCause, SetupError};
pub use gateway::LookupGateway;
pub use record::{AddressRecord, PostalCode};
pub use upstream::{AddressSource, ViaCepSource};
