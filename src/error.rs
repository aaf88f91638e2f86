//! Error type shared by the supervisor, its runners and the collaborators.
//!
//! Two variants are sentinels rather than failures: [`Error::ServerClosed`]
//! is what a listener returns once it has been stopped gracefully, and
//! [`Error::Eof`] is what closers and tasks may return when the resource they
//! own was already drained. The supervisor filters both out of the error path.

use thiserror::Error;

/// Boxed error produced by user services.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a supervision run.
#[derive(Debug, Error)]
pub enum Error {
    /// The listener was stopped by a graceful shutdown.
    #[error("http: Server closed")]
    ServerClosed,

    /// End of stream; treated as a clean close.
    #[error("EOF")]
    Eof,

    /// The shared cancellation token fired before a signal arrived.
    #[error("context canceled")]
    Canceled,

    /// A graceful stop did not finish before the shutdown deadline.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A registration was rejected while building the registry.
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    /// I/O failure (bind, signal subscription, certificate loading).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A supervised unit panicked.
    #[error("service panicked: {0}")]
    Panicked(String),

    /// Any other failure reported by a listener, task or closer.
    #[error(transparent)]
    Service(BoxError),
}

impl Error {
    /// Wrap an arbitrary service error.
    pub fn service<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Service(err.into())
    }

    /// Build a service error from a plain message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Error::Service(msg.into().into())
    }

    /// True for the "listener closed" sentinel.
    pub fn is_server_closed(&self) -> bool {
        matches!(self, Error::ServerClosed)
    }

    /// True for the end-of-file sentinel, including an `UnexpectedEof` I/O error.
    pub fn is_eof(&self) -> bool {
        match self {
            Error::Eof => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
