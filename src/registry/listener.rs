//! Network listener contract.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::lifecycle::Deadline;

/// A network service that accepts connections until told to stop.
///
/// `serve` runs for the lifetime of the service. Once `shutdown` has been
/// called it must return [`Error::ServerClosed`], which the supervisor treats
/// as a clean exit.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Bind `endpoint` and serve until stopped.
    async fn serve(&self, endpoint: &Endpoint) -> Result<(), Error>;

    /// Stop accepting, drain in-flight work and return before `deadline`.
    async fn shutdown(&self, deadline: Deadline) -> Result<(), Error>;
}

/// Certificate and private key files (PEM) for a TLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsFiles {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }

    /// Both halves present.
    pub fn is_complete(&self) -> bool {
        !self.cert.as_os_str().is_empty() && !self.key.as_os_str().is_empty()
    }
}

/// Where and how a listener serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Bind address, e.g. `":7878"` or `"127.0.0.1:8080"`.
    pub addr: String,
    /// TLS material; `None` serves plaintext.
    pub tls: Option<TlsFiles>,
}

impl Endpoint {
    pub fn plain(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            tls: None,
        }
    }

    pub fn tls(addr: impl Into<String>, files: TlsFiles) -> Self {
        Self {
            addr: addr.into(),
            tls: Some(files),
        }
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }
}

/// A registered listener: its endpoint plus a shared handle to the service.
///
/// The handle is shared with the caller, who keeps ownership of the service.
#[derive(Clone)]
pub struct ListenerEntry {
    pub endpoint: Endpoint,
    pub listener: Arc<dyn Listener>,
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
