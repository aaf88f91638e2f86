//! OS signal handling.
//!
//! # Responsibilities
//! - Name the termination signals a run can subscribe to
//! - Subscribe to a set of them and wait for the first delivery
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - `Kill` is accepted in a signal set but can never be caught, so it is
//!   skipped when subscribing
//! - Non-unix platforms only deliver `Interrupt` (Ctrl+C)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Signal {
    Interrupt,
    Terminate,
    Kill,
    Quit,
    Hangup,
    User1,
    User2,
}

impl Signal {
    /// Subscribed when a run names no signals.
    pub const DEFAULT: [Signal; 3] = [Signal::Interrupt, Signal::Terminate, Signal::Kill];

    /// Conventional name, e.g. `SIGUSR1`.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Kill => "SIGKILL",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        }
    }

    /// Human readable description used in log lines.
    pub fn description(self) -> &'static str {
        match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminated",
            Signal::Kill => "killed",
            Signal::Quit => "quit",
            Signal::Hangup => "hangup",
            Signal::User1 => "user defined signal 1",
            Signal::User2 => "user defined signal 2",
        }
    }

    /// Whether a handler can be installed for this signal.
    pub fn is_catchable(self) -> bool {
        self != Signal::Kill
    }

    #[cfg(unix)]
    fn kind(self) -> Option<tokio::signal::unix::SignalKind> {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => Some(SignalKind::interrupt()),
            Signal::Terminate => Some(SignalKind::terminate()),
            Signal::Kill => None,
            Signal::Quit => Some(SignalKind::quit()),
            Signal::Hangup => Some(SignalKind::hangup()),
            Signal::User1 => Some(SignalKind::user_defined1()),
            Signal::User2 => Some(SignalKind::user_defined2()),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unknown signal name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal: {0:?}")]
pub struct ParseSignalError(String);

impl FromStr for Signal {
    type Err = ParseSignalError;

    /// Accepts `SIGTERM`, `TERM`, `term` and the long forms (`terminate`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower.strip_prefix("sig").unwrap_or(&lower);
        match short {
            "int" | "interrupt" => Ok(Signal::Interrupt),
            "term" | "terminate" => Ok(Signal::Terminate),
            "kill" => Ok(Signal::Kill),
            "quit" => Ok(Signal::Quit),
            "hup" | "hangup" => Ok(Signal::Hangup),
            "usr1" => Ok(Signal::User1),
            "usr2" => Ok(Signal::User2),
            _ => Err(ParseSignalError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Signal {
    type Error = ParseSignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Signal> for String {
    fn from(signal: Signal) -> Self {
        signal.name().to_string()
    }
}

/// An active subscription to a set of signals.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct SignalListener {
    #[cfg(unix)]
    streams: Vec<(Signal, tokio::signal::unix::Signal)>,
    #[cfg(not(unix))]
    ctrl_c: bool,
}

impl SignalListener {
    /// Install handlers for every catchable signal in `signals`.
    ///
    /// Must be called from within a Tokio runtime.
    #[cfg(unix)]
    pub fn subscribe(signals: &[Signal]) -> std::io::Result<Self> {
        let mut streams = Vec::with_capacity(signals.len());
        for &signal in signals {
            let Some(kind) = signal.kind() else {
                tracing::debug!(signal = signal.name(), "Signal cannot be caught, skipping");
                continue;
            };
            if streams.iter().any(|(s, _)| *s == signal) {
                continue;
            }
            streams.push((signal, tokio::signal::unix::signal(kind)?));
        }
        tracing::debug!(count = streams.len(), "Subscribed to signals");
        Ok(Self { streams })
    }

    #[cfg(not(unix))]
    pub fn subscribe(signals: &[Signal]) -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: signals.contains(&Signal::Interrupt),
        })
    }

    /// Wait for the next subscribed signal. Never resolves for an empty set.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Signal {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }
        let pending = self.streams.iter_mut().map(|(signal, stream)| {
            Box::pin(async move {
                if stream.recv().await.is_none() {
                    std::future::pending::<()>().await;
                }
                *signal
            })
        });
        let (signal, _, _) = futures_util::future::select_all(pending).await;
        signal
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Signal {
        if self.ctrl_c && tokio::signal::ctrl_c().await.is_ok() {
            return Signal::Interrupt;
        }
        std::future::pending().await
    }
}
