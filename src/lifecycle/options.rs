//! Supervisor options and the injectable logging callbacks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::SupervisorConfig;
use crate::lifecycle::Signal;
use crate::observability::logging;

/// A logging callback. Receives the pre-formatted message.
pub type LogFn = Arc<dyn Fn(fmt::Arguments<'_>) + Send + Sync>;

/// Settings for one supervision run.
#[derive(Clone, Default)]
pub struct Options {
    /// Signals that start the shutdown. Empty means [`Signal::DEFAULT`].
    pub signals: Vec<Signal>,
    /// Parent cancellation; canceling it shuts the run down with
    /// [`Error::Canceled`](crate::Error::Canceled).
    pub parent: Option<CancellationToken>,
    pub log_info: Option<LogFn>,
    pub log_error: Option<LogFn>,
    /// Grace period handed to each listener's graceful stop, measured from
    /// the start of the shutdown. `None` waits for listeners to drain.
    pub shutdown_timeout: Option<Duration>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options derived from a loaded config, logging through `tracing`.
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            signals: config.signals.clone(),
            shutdown_timeout: config.shutdown_timeout(),
            ..Self::default()
        }
        .with_tracing()
    }

    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.signals = signals.into_iter().collect();
        self
    }

    pub fn with_parent(mut self, parent: CancellationToken) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_log_info(mut self, log: LogFn) -> Self {
        self.log_info = Some(log);
        self
    }

    pub fn with_log_error(mut self, log: LogFn) -> Self {
        self.log_error = Some(log);
        self
    }

    /// Route both callbacks to `tracing` at info and error level.
    pub fn with_tracing(self) -> Self {
        self.with_log_info(logging::tracing_info())
            .with_log_error(logging::tracing_error())
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Configured signals, or the defaults when none were given.
    pub fn effective_signals(&self) -> Vec<Signal> {
        if self.signals.is_empty() {
            Signal::DEFAULT.to_vec()
        } else {
            self.signals.clone()
        }
    }

    pub fn logger(&self) -> Logger {
        Logger {
            info: self.log_info.clone(),
            error: self.log_error.clone(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("signals", &self.signals)
            .field("parent", &self.parent)
            .field("log_info", &self.log_info.is_some())
            .field("log_error", &self.log_error.is_some())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

/// The two callbacks, each a no-op when absent.
#[derive(Clone, Default)]
pub struct Logger {
    info: Option<LogFn>,
    error: Option<LogFn>,
}

impl Logger {
    pub fn info(&self, args: fmt::Arguments<'_>) {
        if let Some(log) = &self.info {
            log(args);
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        if let Some(log) = &self.error {
            log(args);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("info", &self.info.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
