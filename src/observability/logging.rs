//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Provide supervisor log callbacks backed by `tracing`

use std::fmt;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::lifecycle::LogFn;

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let fallback = format!("servicerun={default_level},tower_http={default_level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Info callback that emits a `tracing` info event.
pub fn tracing_info() -> LogFn {
    Arc::new(|args: fmt::Arguments<'_>| tracing::info!("{}", args))
}

/// Error callback that emits a `tracing` error event.
pub fn tracing_error() -> LogFn {
    Arc::new(|args: fmt::Arguments<'_>| tracing::error!("{}", args))
}
