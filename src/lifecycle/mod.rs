//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Registry → subscribe signals → spawn watcher → spawn runners
//!
//! Runners (runners.rs):
//!     serve / run task → failure cancels the shared token
//!
//! Signals (signals.rs + supervisor.rs watcher):
//!     signal received  → cancel token ─┐
//!     token canceled   → "context canceled" ─┴→ shutdown.rs (exactly once)
//!
//! Shutdown (shutdown.rs):
//!     closers before → listeners → closers after (first error wins)
//!
//! Join (group.rs):
//!     wait for every unit → first recorded error or Ok
//! ```
//!
//! # Design Decisions
//! - One shared CancellationToken is the only cross-unit signal
//! - Failures are recorded before the token is canceled, so a runner
//!   failure always beats the watcher's `Canceled`
//! - Shutdown phases are sequential and exhaustive
//! - Background tasks are never aborted; they may watch the token

pub mod group;
pub mod options;
pub mod runners;
pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use group::{FirstError, TaskGroup};
pub use options::{LogFn, Logger, Options};
pub use shutdown::{Deadline, ShutdownPlan};
pub use signals::{ParseSignalError, Signal, SignalListener};
pub use supervisor::{run, Supervisor};
