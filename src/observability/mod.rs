//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor log callbacks (Options::log_info / log_error)
//!     → logging.rs (forward contract lines to tracing)
//! Runners, watcher, shutdown phases
//!     → metrics.rs (counters)
//!     → Prometheus exporter (served as a registered listener)
//! ```
//!
//! # Design Decisions
//! - The core never depends on a subscriber; callbacks default to no-ops
//! - Metric updates are no-ops until a recorder is installed
//! - RUST_LOG overrides the configured log level

pub mod logging;
pub mod metrics;
