//! Network layer helpers used by the HTTP listener.
//!
//! # Data Flow
//! ```text
//! Endpoint.addr (":7878", "127.0.0.1:8080", "localhost:80")
//!     → address.rs (resolve to a SocketAddr)
//! Endpoint.tls (cert + key paths)
//!     → tls.rs (load rustls config)
//!     → axum-server bind / bind_rustls
//! ```

pub mod address;
pub mod tls;

pub use address::{parse_bind_address, resolve_bind_address};
pub use tls::load_tls_config;
