//! Routes served by the binary's listeners.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// `GET /health` answers `ok`, `GET /` answers with the listener name.
pub fn service_router(name: impl Into<String>) -> Router {
    let name: Arc<str> = Arc::from(name.into());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/",
            get(move || {
                let name = name.clone();
                async move { name.to_string() }
            }),
        )
        .layer(TraceLayer::new_for_http())
}
