//! Named closeable resources.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;

/// A resource with a single shutdown action.
///
/// Returning [`Error::Eof`] counts as a successful close.
#[async_trait]
pub trait Close: Send + Sync {
    async fn close(&self) -> Result<(), Error>;
}

/// Closer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopCloser;

#[async_trait]
impl Close for NopCloser {
    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Adapts an async closure into a [`Close`].
pub struct CloseFn<F>(F);

/// Build a closer from an async closure.
pub fn close_fn<F, Fut>(f: F) -> CloseFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    CloseFn(f)
}

#[async_trait]
impl<F, Fut> Close for CloseFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    async fn close(&self) -> Result<(), Error> {
        (self.0)().await
    }
}

impl<F> fmt::Debug for CloseFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CloseFn")
    }
}

/// A closer paired with the name used in log lines.
#[derive(Clone)]
pub struct NamedCloser {
    pub name: String,
    pub closer: Arc<dyn Close>,
}

impl NamedCloser {
    pub fn new(name: impl Into<String>, closer: Arc<dyn Close>) -> Self {
        Self {
            name: name.into(),
            closer,
        }
    }
}

impl fmt::Debug for NamedCloser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedCloser")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
