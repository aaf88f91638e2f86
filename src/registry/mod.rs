//! Service registry.
//!
//! # Data Flow
//! ```text
//! Vec<Registration> (caller order)
//!     → RegistryBuilder::register (validate, append to one sequence)
//!     → Registry (immutable)
//!     → lifecycle::Supervisor::run
//!         listeners → one runner each + shutdown phase 2
//!         tasks     → one runner each
//!         closers   → shutdown phases 1 and 3
//! ```
//!
//! # Design Decisions
//! - Registration order is kept; closers run in that order
//! - No deduplication, duplicate names are fine
//! - The first invalid registration aborts the build, nothing is started
//! - Listeners and closers are shared handles; the caller keeps ownership
//! - Empty addresses are rejected (no implicit default port), as are blank
//!   task and closer names

pub mod closer;
pub mod listener;
pub mod task;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::lifecycle::ShutdownPlan;

pub use closer::{close_fn, Close, CloseFn, NamedCloser, NopCloser};
pub use listener::{Endpoint, Listener, ListenerEntry, TlsFiles};
pub use task::Task;

/// One configuration step, applied in caller order.
#[derive(Debug)]
pub enum Registration {
    /// Serve a listener and stop it during shutdown.
    Listener(ListenerEntry),
    /// Run a background task once.
    Task(Task),
    /// Close before the listeners are shut down.
    CloserBefore(NamedCloser),
    /// Close after the listeners are shut down.
    CloserAfter(NamedCloser),
}

impl Registration {
    /// Plaintext listener at `addr`.
    pub fn listener(addr: impl Into<String>, listener: Arc<dyn Listener>) -> Self {
        Registration::Listener(ListenerEntry {
            endpoint: Endpoint::plain(addr),
            listener,
        })
    }

    /// TLS listener at `addr` using the given certificate and key files.
    pub fn listener_tls(
        addr: impl Into<String>,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
        listener: Arc<dyn Listener>,
    ) -> Self {
        Registration::Listener(ListenerEntry {
            endpoint: Endpoint::tls(addr, TlsFiles::new(cert, key)),
            listener,
        })
    }

    /// Background task that runs `fut` once.
    pub fn start_fn<F>(name: impl Into<String>, fut: F) -> Self
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Registration::Task(Task::new(name, fut))
    }

    /// Background task that receives the shared cancellation token.
    pub fn start_fn_with_token<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Registration::Task(Task::with_token(name, f))
    }

    pub fn closer_before(name: impl Into<String>, closer: Arc<dyn Close>) -> Self {
        Registration::CloserBefore(NamedCloser::new(name, closer))
    }

    pub fn closer_after(name: impl Into<String>, closer: Arc<dyn Close>) -> Self {
        Registration::CloserAfter(NamedCloser::new(name, closer))
    }
}

/// What to run and what to close. Built once, immutable afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    listeners: Vec<ListenerEntry>,
    tasks: Vec<Task>,
    closers_before: Vec<NamedCloser>,
    closers_after: Vec<NamedCloser>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Fold `registrations` in order, stopping at the first invalid one.
    pub fn from_registrations<I>(registrations: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Registration>,
    {
        registrations
            .into_iter()
            .try_fold(Self::builder(), RegistryBuilder::register)
            .map(RegistryBuilder::build)
    }

    pub fn listeners(&self) -> &[ListenerEntry] {
        &self.listeners
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn closers_before(&self) -> &[NamedCloser] {
        &self.closers_before
    }

    pub fn closers_after(&self) -> &[NamedCloser] {
        &self.closers_after
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
            && self.tasks.is_empty()
            && self.closers_before.is_empty()
            && self.closers_after.is_empty()
    }

    /// Split into the runner inputs and the shutdown plan.
    pub(crate) fn into_parts(self) -> (Vec<ListenerEntry>, Vec<Task>, ShutdownPlan) {
        let plan = ShutdownPlan::new(
            self.closers_before,
            self.listeners.clone(),
            self.closers_after,
        );
        (self.listeners, self.tasks, plan)
    }
}

/// Accumulates registrations into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Validate `registration` and append it.
    pub fn register(mut self, registration: Registration) -> Result<Self, Error> {
        self.apply(registration)?;
        Ok(self)
    }

    /// In-place form of [`register`](Self::register).
    pub fn apply(&mut self, registration: Registration) -> Result<(), Error> {
        match registration {
            Registration::Listener(entry) => {
                validate_endpoint(&entry.endpoint)?;
                self.registry.listeners.push(entry);
            }
            Registration::Task(task) => {
                validate_name("task", task.name())?;
                self.registry.tasks.push(task);
            }
            Registration::CloserBefore(closer) => {
                validate_name("closer", &closer.name)?;
                self.registry.closers_before.push(closer);
            }
            Registration::CloserAfter(closer) => {
                validate_name("closer", &closer.name)?;
                self.registry.closers_after.push(closer);
            }
        }
        Ok(())
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}

fn validate_endpoint(endpoint: &Endpoint) -> Result<(), Error> {
    if endpoint.addr.trim().is_empty() {
        return Err(Error::InvalidRegistration(
            "listener address must not be empty".to_string(),
        ));
    }
    match &endpoint.tls {
        Some(files) if !files.is_complete() => Err(Error::InvalidRegistration(format!(
            "listener {:?}: TLS requires both a certificate and a key file",
            endpoint.addr
        ))),
        _ => Ok(()),
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::InvalidRegistration(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(())
}
