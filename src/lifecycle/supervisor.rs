//! Supervision entry point and the signal/cancellation watcher.

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::lifecycle::{
    runners, Deadline, Logger, Options, ShutdownPlan, SignalListener, TaskGroup,
};
use crate::observability::metrics;
use crate::registry::{Registration, Registry};

/// Build a registry from `registrations` and supervise it.
///
/// Returns once every unit has finished: `Ok(())` after a clean
/// signal-triggered shutdown, otherwise the first error of the run.
pub async fn run<I>(options: Options, registrations: I) -> Result<(), Error>
where
    I: IntoIterator<Item = Registration>,
{
    let registry = Registry::from_registrations(registrations)?;
    Supervisor::new(options).run(registry).await
}

/// Runs a [`Registry`] until a signal or the first failure, then shuts it
/// down in order.
#[derive(Debug, Default)]
pub struct Supervisor {
    options: Options,
}

impl Supervisor {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Start every service, wait for the shutdown trigger, shut down.
    pub async fn run(self, registry: Registry) -> Result<(), Error> {
        let log = self.options.logger();
        let signals = SignalListener::subscribe(&self.options.effective_signals())?;
        let parent = self.options.parent.clone().unwrap_or_else(CancellationToken::new);

        let mut group = TaskGroup::new(&parent);
        let token = group.token();
        let (listeners, tasks, plan) = registry.into_parts();

        tracing::debug!(
            listeners = listeners.len(),
            tasks = tasks.len(),
            "Supervisor starting"
        );

        group.spawn(watch(
            signals,
            token.clone(),
            plan,
            self.options.shutdown_timeout,
            log.clone(),
        ));
        for entry in listeners {
            group.spawn(runners::run_listener(entry, log.clone()));
        }
        for task in tasks {
            group.spawn(runners::run_task(task, token.clone(), log.clone()));
        }

        let result = group.wait().await;
        tracing::debug!(ok = result.is_ok(), "Supervisor finished");
        result
    }
}

/// Wait for a signal or for the shared token, then run the shutdown plan once.
async fn watch(
    mut signals: SignalListener,
    token: CancellationToken,
    plan: ShutdownPlan,
    shutdown_timeout: Option<std::time::Duration>,
    log: Logger,
) -> Result<(), Error> {
    let received = tokio::select! {
        signal = signals.recv() => Some(signal),
        _ = token.cancelled() => None,
    };
    drop(signals);

    let triggered = match received {
        Some(signal) => {
            log.info(format_args!("received signal: {}", signal));
            metrics::record_signal(signal);
            token.cancel();
            Ok(())
        }
        None => {
            log.info(format_args!("context canceled, closing signal watcher"));
            Err(Error::Canceled)
        }
    };

    let shutdown = plan
        .execute(Deadline::from_timeout(shutdown_timeout), &log)
        .await;
    triggered.and(shutdown)
}
