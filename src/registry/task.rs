//! Named background tasks.

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

type TaskFn = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Result<(), Error>> + Send>;

/// A named operation run exactly once, concurrently with the listeners.
///
/// The supervisor never interrupts a task. Tasks that need to unwind on
/// shutdown should be built with [`Task::with_token`] and watch the token.
pub struct Task {
    name: String,
    run: TaskFn,
}

impl Task {
    /// A task that does not observe cancellation.
    pub fn new<F>(name: impl Into<String>, fut: F) -> Self
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move |_| fut.boxed()),
        }
    }

    /// A task handed the shared cancellation token when it starts.
    pub fn with_token<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move |token| f(token).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume the task and run it.
    pub(crate) async fn run(self, token: CancellationToken) -> Result<(), Error> {
        (self.run)(token).await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_is_passed_through() {
        let token = CancellationToken::new();
        token.cancel();
        let task = Task::with_token("watcher", |token| async move {
            if token.is_cancelled() {
                Ok(())
            } else {
                Err(Error::msg("token not cancelled"))
            }
        });
        assert_eq!(task.name(), "watcher");
        assert!(task.run(token).await.is_ok());
    }
}
