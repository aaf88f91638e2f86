//! HTTP listener collaborator.
//!
//! # Data Flow
//! ```text
//! Registration::http_handler(addr, Router)
//!     → server.rs (HttpListener: axum-server, plain or rustls)
//!     → lifecycle runner: serve() until graceful stop
//!     → shutdown phase 2: shutdown(deadline)
//!
//! routes.rs: the small router the binary serves on each listener
//! ```
//!
//! # Design Decisions
//! - `serve` returns `Error::ServerClosed` after a graceful stop, also when
//!   the stop came first
//! - The grace period handed to axum-server is the time left before the
//!   shutdown deadline

pub mod routes;
pub mod server;

pub use routes::service_router;
pub use server::HttpListener;
