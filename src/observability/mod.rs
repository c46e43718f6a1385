//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → logging.rs (structured log events, tower-http spans)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through spans and activity logs
//! - Metrics are recorded through the `metrics` facade; without an
//!   installed recorder they are no-ops
//! - Error internals are only logged in debug mode

pub mod logging;
pub mod metrics;
