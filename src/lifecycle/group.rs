//! Task group: spawn units, share one cancellation token, keep the first error.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// A slot that accepts only the first error offered to it.
#[derive(Debug, Default)]
pub struct FirstError(Mutex<Option<Error>>);

impl FirstError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `err` if the slot is empty. Returns whether it was stored.
    pub fn set(&self, err: Error) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        true
    }

    pub fn is_set(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn take(&self) -> Option<Error> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// `Ok(())` when empty, otherwise the stored error.
    pub fn into_result(self) -> Result<(), Error> {
        match self.0.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Concurrent units sharing one cancellation token.
///
/// The first unit to fail records its error and cancels the token.
#[derive(Debug)]
pub struct TaskGroup {
    token: CancellationToken,
    first_error: Arc<FirstError>,
    tasks: JoinSet<()>,
}

impl TaskGroup {
    /// A group whose token is a child of `parent`.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            first_error: Arc::new(FirstError::new()),
            tasks: JoinSet::new(),
        }
    }

    /// The shared token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a unit. A failure is recorded before the token is canceled.
    pub fn spawn<F>(&mut self, unit: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let token = self.token.clone();
        let first_error = self.first_error.clone();
        self.tasks.spawn(async move {
            if let Err(err) = unit.await {
                tracing::debug!(error = %err, "Unit failed");
                if first_error.set(err) {
                    token.cancel();
                }
            }
        });
    }

    /// Wait for every unit and return the first recorded error.
    pub async fn wait(mut self) -> Result<(), Error> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(join_err) = joined {
                if self.first_error.set(panic_error(join_err)) {
                    self.token.cancel();
                }
            }
        }
        self.token.cancel();
        match Arc::try_unwrap(self.first_error) {
            Ok(first_error) => first_error.into_result(),
            Err(shared) => shared.take().map_or(Ok(()), Err),
        }
    }
}

fn panic_error(err: JoinError) -> Error {
    if !err.is_panic() {
        return Error::Panicked("unit was cancelled".to_string());
    }
    let payload = err.into_panic();
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    Error::Panicked(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_error_keeps_the_first() {
        let slot = FirstError::new();
        assert!(slot.set(Error::msg("first")));
        assert!(!slot.set(Error::msg("second")));
        assert!(slot.is_set());
        assert_eq!(slot.into_result().unwrap_err().to_string(), "first");
    }

    #[tokio::test]
    async fn all_ok_returns_ok_and_cancels_token() {
        let mut group = TaskGroup::new(&CancellationToken::new());
        let token = group.token();
        group.spawn(async { Ok(()) });
        group.spawn(async { Ok(()) });
        assert_eq!(group.len(), 2);
        assert!(group.wait().await.is_ok());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn failure_cancels_the_others() {
        let mut group = TaskGroup::new(&CancellationToken::new());
        let token = group.token();
        group.spawn(async move {
            token.cancelled().await;
            Err(Error::Canceled)
        });
        group.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(Error::msg("boom"))
        });
        assert_eq!(group.wait().await.unwrap_err().to_string(), "boom");
    }

    #[tokio::test]
    async fn parent_cancellation_reaches_units() {
        let parent = CancellationToken::new();
        let mut group = TaskGroup::new(&parent);
        let token = group.token();
        group.spawn(async move {
            token.cancelled().await;
            Ok(())
        });
        parent.cancel();
        assert!(group.wait().await.is_ok());
    }

    #[tokio::test]
    async fn panic_is_reported() {
        let mut group = TaskGroup::new(&CancellationToken::new());
        let token = group.token();
        let observer = token.clone();
        group.spawn(async move {
            if observer.is_cancelled() {
                return Ok(());
            }
            panic!("unit exploded")
        });
        let err = group.wait().await.unwrap_err();
        assert_eq!(err.to_string(), "service panicked: unit exploded");
        assert!(token.is_cancelled());
    }
}
