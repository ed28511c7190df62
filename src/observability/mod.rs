//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (stage, key count, outcome)
//! - Request ID flows from the HTTP layer into handler spans
//! - Metrics are cheap (atomic increments) and safe to record with no
//!   exporter installed

pub mod logging;
pub mod metrics;
