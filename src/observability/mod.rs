//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lookup, breaker and HTTP layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into every span
//! - Metrics are cheap and safe to record before a recorder is installed

pub mod logging;
pub mod metrics;
