//! Metrics collection and exposition.
//!
//! # Metrics
//! - `servicerun_units_started_total` (counter): runners started, by kind
//! - `servicerun_unit_failures_total` (counter): runner failures, by kind
//! - `servicerun_shutdown_errors_total` (counter): shutdown errors, by phase
//! - `servicerun_signals_received_total` (counter): by signal name

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::lifecycle::Signal;

pub fn record_unit_started(kind: &'static str) {
    metrics::counter!("servicerun_units_started_total", "kind" => kind).increment(1);
}

pub fn record_unit_failure(kind: &'static str) {
    metrics::counter!("servicerun_unit_failures_total", "kind" => kind).increment(1);
}

pub fn record_shutdown_error(phase: &'static str) {
    metrics::counter!("servicerun_shutdown_errors_total", "phase" => phase).increment(1);
}

pub fn record_signal(signal: Signal) {
    metrics::counter!("servicerun_signals_received_total", "signal" => signal.name()).increment(1);
}

/// Install the global Prometheus recorder.
///
/// Exposition is left to the caller, see [`router`].
pub fn install_exporter() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Router answering `GET /metrics` with the current snapshot.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}
