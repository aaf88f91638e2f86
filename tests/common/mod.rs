//! Shared fakes for the supervisor integration tests.
#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use servicerun::{Close, Deadline, Endpoint, Error, Listener, LogFn, Options};
use tokio_util::sync::CancellationToken;

/// Collects every line from both log callbacks, in order.
#[derive(Clone, Default)]
pub struct LogRecorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_fn(&self) -> LogFn {
        let lines = self.lines.clone();
        Arc::new(move |args: fmt::Arguments<'_>| lines.lock().unwrap().push(args.to_string()))
    }

    /// Options wired to this recorder, subscribed to no catchable signal.
    pub fn options(&self) -> Options {
        Options::new()
            .with_signals([servicerun::Signal::Kill])
            .with_log_info(self.log_fn())
            .with_log_error(self.log_fn())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|line| line.contains(needle))
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|line| line.contains(needle)).count()
    }

    /// Assert every needle appears, in the given order.
    pub fn assert_in_order(&self, needles: &[&str]) {
        let lines = self.lines();
        let mut from = 0;
        for needle in needles {
            match lines[from..].iter().position(|line| line.contains(needle)) {
                Some(offset) => from += offset + 1,
                None => panic!("missing {needle:?} (in order) in log:\n{}", lines.join("\n")),
            }
        }
    }

    /// Poll until a line containing `needle` shows up.
    pub async fn wait_for(&self, needle: &str) {
        for _ in 0..200 {
            if self.contains(needle) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {needle:?} in log:\n{}", self.lines().join("\n"));
    }
}

/// Shared record of shutdown actions across fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Listener that serves until `shutdown`, with scripted failures.
pub struct FakeListener {
    label: String,
    journal: Journal,
    stop: CancellationToken,
    serve_error: Mutex<Option<Error>>,
    shutdown_error: Mutex<Option<Error>>,
    serves: AtomicUsize,
    shutdowns: AtomicUsize,
    deadlines: Mutex<Vec<Deadline>>,
}

impl FakeListener {
    pub fn new(label: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            journal: journal.clone(),
            stop: CancellationToken::new(),
            serve_error: Mutex::new(None),
            shutdown_error: Mutex::new(None),
            serves: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            deadlines: Mutex::new(Vec::new()),
        })
    }

    /// `serve` fails right away with `msg`.
    pub fn failing_serve(label: &str, journal: &Journal, msg: &str) -> Arc<Self> {
        let listener = Self::new(label, journal);
        *listener.serve_error.lock().unwrap() = Some(Error::msg(msg));
        listener
    }

    /// `shutdown` fails with `msg`.
    pub fn failing_shutdown(label: &str, journal: &Journal, msg: &str) -> Arc<Self> {
        let listener = Self::new(label, journal);
        *listener.shutdown_error.lock().unwrap() = Some(Error::msg(msg));
        listener
    }

    pub fn serves(&self) -> usize {
        self.serves.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn deadlines(&self) -> Vec<Deadline> {
        self.deadlines.lock().unwrap().clone()
    }
}

#[async_trait]
impl Listener for FakeListener {
    async fn serve(&self, _endpoint: &Endpoint) -> Result<(), Error> {
        self.serves.fetch_add(1, Ordering::SeqCst);
        let scripted = self.serve_error.lock().unwrap().take();
        if let Some(err) = scripted {
            return Err(err);
        }
        self.stop.cancelled().await;
        Err(Error::ServerClosed)
    }

    async fn shutdown(&self, deadline: Deadline) -> Result<(), Error> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.deadlines.lock().unwrap().push(deadline);
        self.journal.lock().unwrap().push(format!("shutdown {}", self.label));
        self.stop.cancel();
        match self.shutdown_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Closer that journals its name and optionally fails.
pub struct JournalCloser {
    label: String,
    journal: Journal,
    error: Mutex<Option<Error>>,
    closes: AtomicUsize,
}

impl JournalCloser {
    pub fn new(label: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            journal: journal.clone(),
            error: Mutex::new(None),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn failing(label: &str, journal: &Journal, err: Error) -> Arc<Self> {
        let closer = Self::new(label, journal);
        *closer.error.lock().unwrap() = Some(err);
        closer
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Close for JournalCloser {
    async fn close(&self) -> Result<(), Error> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push(format!("close {}", self.label));
        match self.error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
