//! Process-lifetime service supervisor.
//!
//! Starts network listeners and background tasks concurrently, waits for a
//! termination signal or the first failure, then shuts everything down in
//! order: closers before, listeners, closers after. The caller gets back
//! one result: `Ok(())` or the first error of the run.
//!
//! ```no_run
//! use std::sync::Arc;
//! use servicerun::{http::service_router, Options, Registration, NopCloser};
//!
//! # async fn demo() -> Result<(), servicerun::Error> {
//! servicerun::run(
//!     Options::new().with_tracing(),
//!     [
//!         Registration::http_handler(":7878", service_router("public")),
//!         Registration::start_fn("warmup", async { Ok(()) }),
//!         Registration::closer_before("queue", Arc::new(NopCloser)),
//!     ],
//! )
//! .await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod registry;

pub use error::{BoxError, Error};
pub use lifecycle::{run, Deadline, LogFn, Options, Signal, Supervisor};
pub use registry::{
    close_fn, Close, Endpoint, Listener, NopCloser, Registration, Registry, Task, TlsFiles,
};
