//! Shutdown sequencing.
//!
//! Three phases, strictly in order, each visiting every member:
//! closers before → listeners → closers after. The first error across the
//! whole sequence is returned; later ones are only logged.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Error;
use crate::lifecycle::{FirstError, Logger};
use crate::observability::metrics;
use crate::registry::{ListenerEntry, NamedCloser};

/// Point in time by which a graceful stop should be done. `None` means
/// no deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or_else(Self::none, Self::after)
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    /// Time left, saturating at zero. `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| at <= Instant::now())
    }

    /// Resolve once the deadline passes; never without one.
    pub async fn expired(&self) {
        match self.0 {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}

/// Everything the shutdown sequence visits, in registration order.
#[derive(Debug, Default)]
pub struct ShutdownPlan {
    before: Vec<NamedCloser>,
    listeners: Vec<ListenerEntry>,
    after: Vec<NamedCloser>,
}

impl ShutdownPlan {
    pub fn new(
        before: Vec<NamedCloser>,
        listeners: Vec<ListenerEntry>,
        after: Vec<NamedCloser>,
    ) -> Self {
        Self {
            before,
            listeners,
            after,
        }
    }

    /// Run every phase and return the first error encountered.
    pub async fn execute(self, deadline: Deadline, log: &Logger) -> Result<(), Error> {
        let first_error = FirstError::new();

        tracing::debug!(count = self.before.len(), "Shutdown phase: closers before");
        for c in &self.before {
            log.info(format_args!("closing before: {:?}", c.name));
            close_one(c, "before", log, &first_error).await;
        }

        tracing::debug!(count = self.listeners.len(), "Shutdown phase: listeners");
        for entry in &self.listeners {
            let addr = &entry.endpoint.addr;
            log.info(format_args!("shutting down server {}", addr));
            if let Err(err) = entry.listener.shutdown(deadline).await {
                log.error(format_args!(
                    "service {} failed to shutdown with error: {}",
                    addr, err
                ));
                metrics::record_shutdown_error("listeners");
                first_error.set(err);
            }
        }

        tracing::debug!(count = self.after.len(), "Shutdown phase: closers after");
        for c in &self.after {
            log.info(format_args!("closing after: {:?}", c.name));
            close_one(c, "after", log, &first_error).await;
        }

        first_error.into_result()
    }
}

async fn close_one(c: &NamedCloser, phase: &'static str, log: &Logger, first_error: &FirstError) {
    match c.closer.close().await {
        Ok(()) => {}
        Err(err) if err.is_eof() => {}
        Err(err) => {
            log.error(format_args!(
                "service {:?} failed to close with error: {}",
                c.name, err
            ));
            metrics::record_shutdown_error(phase);
            first_error.set(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{close_fn, Close, NopCloser};
    use std::sync::{Arc, Mutex};

    fn recording(order: &Arc<Mutex<Vec<String>>>, name: &str, fail: bool) -> NamedCloser {
        let order = order.clone();
        let label = name.to_string();
        let closer: Arc<dyn Close> = Arc::new(close_fn(move || {
            let order = order.clone();
            let label = label.clone();
            async move {
                order.lock().unwrap().push(label.clone());
                if fail {
                    Err(Error::msg(format!("{label} broke")))
                } else {
                    Ok(())
                }
            }
        }));
        NamedCloser::new(name, closer)
    }

    #[tokio::test]
    async fn visits_every_closer_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let plan = ShutdownPlan::new(
            vec![
                recording(&order, "b1", true),
                recording(&order, "b2", false),
            ],
            Vec::new(),
            vec![
                recording(&order, "a1", true),
                recording(&order, "a2", false),
            ],
        );

        let err = plan.execute(Deadline::none(), &Logger::default()).await.unwrap_err();

        assert_eq!(err.to_string(), "b1 broke");
        assert_eq!(*order.lock().unwrap(), ["b1", "b2", "a1", "a2"]);
    }

    #[tokio::test]
    async fn eof_counts_as_closed() {
        let eof: Arc<dyn Close> = Arc::new(close_fn(|| async { Err::<(), _>(Error::Eof) }));
        let plan = ShutdownPlan::new(
            vec![NamedCloser::new("stream", eof)],
            Vec::new(),
            vec![NamedCloser::new("nop", Arc::new(NopCloser))],
        );
        assert!(plan.execute(Deadline::none(), &Logger::default()).await.is_ok());
    }

    #[test]
    fn deadline_arithmetic() {
        assert_eq!(Deadline::none().remaining(), None);
        assert!(!Deadline::none().is_expired());
        assert_eq!(Deadline::from_timeout(None), Deadline::none());

        let past = Deadline::at(Instant::now() - Duration::from_secs(1));
        assert!(past.is_expired());
        assert_eq!(past.remaining(), Some(Duration::ZERO));

        let future = Deadline::after(Duration::from_secs(60));
        assert!(future.remaining().unwrap() > Duration::from_secs(59));
    }

    #[tokio::test]
    async fn expired_resolves_at_deadline() {
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(1), deadline.expired())
            .await
            .unwrap();
    }
}
