//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Lookup against the upstream:
//!     → circuit_breaker.rs (permit or short-circuit)
//!     → upstream call bounded by connect/request timeouts
//!     → outcome reported back through the permit
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - A timeout counts as a failure, exactly like a refused connection
//! - Circuit breaker prevents piling slow calls onto a degraded upstream

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerSnapshot, CallPermit, CircuitBreaker, CircuitState, Outcome};
