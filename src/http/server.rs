//! HTTP server driven by the supervisor.
//!
//! # Responsibilities
//! - Bind the endpoint (plain or TLS) and serve an Axum router
//! - Graceful stop bounded by the shutdown deadline
//! - Report the bound address (port 0 friendly)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_server::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::lifecycle::Deadline;
use crate::net;
use crate::registry::{Endpoint, Listener, Registration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServeState {
    Idle,
    Serving,
    Stopped,
}

/// An Axum router served through axum-server.
///
/// Serves once; after `shutdown` every `serve` call returns
/// [`Error::ServerClosed`].
#[derive(Debug)]
pub struct HttpListener {
    router: Router,
    handle: Handle,
    closed: CancellationToken,
    state: watch::Sender<ServeState>,
}

impl HttpListener {
    pub fn new(router: Router) -> Self {
        let (state, _) = watch::channel(ServeState::Idle);
        Self {
            router,
            handle: Handle::new(),
            closed: CancellationToken::new(),
            state,
        }
    }

    /// The bound address, once listening. `None` if binding failed.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.listening().await
    }

    /// Connections currently open.
    pub fn connection_count(&self) -> usize {
        self.handle.connection_count()
    }

    async fn serve_inner(&self, endpoint: &Endpoint) -> Result<(), Error> {
        let addr = net::resolve_bind_address(&endpoint.addr).await?;
        let app = self.router.clone().into_make_service();

        tracing::info!(address = %addr, tls = endpoint.is_tls(), "HTTP server starting");
        match &endpoint.tls {
            Some(files) => {
                let config = net::load_tls_config(files).await?;
                axum_server::bind_rustls(addr, config)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await?;
            }
            None => {
                axum_server::bind(addr)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await?;
            }
        }
        tracing::info!(address = %addr, "HTTP server stopped");

        if self.closed.is_cancelled() {
            Err(Error::ServerClosed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Listener for HttpListener {
    async fn serve(&self, endpoint: &Endpoint) -> Result<(), Error> {
        self.state.send_replace(ServeState::Serving);
        let result = if self.closed.is_cancelled() {
            Err(Error::ServerClosed)
        } else {
            self.serve_inner(endpoint).await
        };
        self.state.send_replace(ServeState::Stopped);
        result
    }

    async fn shutdown(&self, deadline: Deadline) -> Result<(), Error> {
        self.closed.cancel();
        self.handle.graceful_shutdown(deadline.remaining());

        let mut state = self.state.subscribe();
        let drained = async move {
            let _ = state.wait_for(|s| *s != ServeState::Serving).await;
        };
        tokio::pin!(drained);
        tokio::select! {
            biased;
            _ = &mut drained => return Ok(()),
            _ = deadline.expired() => {}
        }

        // An idle server only needs a few polls to leave its accept loop.
        let connections = self.connection_count();
        if connections == 0 {
            drained.await;
            return Ok(());
        }
        tracing::warn!(connections, "Graceful shutdown deadline exceeded");
        Err(Error::DeadlineExceeded)
    }
}

impl Registration {
    /// Serve `router` in plaintext at `addr`.
    pub fn http_handler(addr: impl Into<String>, router: Router) -> Self {
        Registration::listener(addr, Arc::new(HttpListener::new(router)))
    }

    /// Serve `router` over TLS at `addr`.
    pub fn http_handler_tls(
        addr: impl Into<String>,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
        router: Router,
    ) -> Self {
        Registration::listener_tls(addr, cert, key, Arc::new(HttpListener::new(router)))
    }

    /// Serve a caller-held listener in plaintext at `addr`.
    pub fn http_server(addr: impl Into<String>, listener: Arc<HttpListener>) -> Self {
        Registration::listener(addr, listener)
    }

    /// Serve a caller-held listener over TLS at `addr`.
    pub fn http_server_tls(
        addr: impl Into<String>,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
        listener: Arc<HttpListener>,
    ) -> Self {
        Registration::listener_tls(addr, cert, key, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_before_serve_closes_immediately() {
        let listener = HttpListener::new(Router::new());
        listener.shutdown(Deadline::none()).await.unwrap();
        let err = listener
            .serve(&Endpoint::plain("127.0.0.1:0"))
            .await
            .unwrap_err();
        assert!(err.is_server_closed());
    }

    #[tokio::test]
    async fn serve_then_graceful_stop() {
        let listener = Arc::new(HttpListener::new(Router::new()));
        let serving = listener.clone();
        let join = tokio::spawn(async move { serving.serve(&Endpoint::plain("127.0.0.1:0")).await });

        let addr = listener.local_addr().await.expect("listening");
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);

        listener
            .shutdown(Deadline::after(Duration::from_secs(5)))
            .await
            .unwrap();
        let served = join.await.unwrap();
        assert!(served.unwrap_err().is_server_closed());
    }

    #[tokio::test]
    async fn idle_listener_stops_after_deadline_passed() {
        let listener = Arc::new(HttpListener::new(Router::new()));
        let serving = listener.clone();
        let join = tokio::spawn(async move { serving.serve(&Endpoint::plain("127.0.0.1:0")).await });
        listener.local_addr().await.expect("listening");

        let expired = Deadline::at(tokio::time::Instant::now() - Duration::from_millis(1));
        listener.shutdown(expired).await.unwrap();

        let served = tokio::time::timeout(Duration::from_secs(5), join)
            .await
            .expect("serve returned")
            .unwrap();
        assert!(served.unwrap_err().is_server_closed());
    }

    #[tokio::test]
    async fn bad_address_fails_serve() {
        let listener = HttpListener::new(Router::new());
        let err = listener
            .serve(&Endpoint::plain("definitely not an address"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
