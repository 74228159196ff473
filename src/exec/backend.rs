// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The supervisor talks to a `ProcessLauncher` and the `RunningJob`s it
//! hands back instead of to `tokio::process` directly. Production code uses
//! [`CommandLauncher`](super::CommandLauncher); tests can provide a launcher
//! whose jobs exit on a script without spawning anything.

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;

use crate::engine::JobStatus;
use crate::errors::LaunchError;
use crate::worklist::WorkItem;

/// A launched job as seen by the supervisor.
pub trait RunningJob: Send {
    fn item(&self) -> &WorkItem;

    fn log_path(&self) -> &Path;

    /// Non-blocking status check.
    ///
    /// Once this has answered `Exited`, the job's log is closed and every
    /// later call answers the same `Exited` code.
    fn try_status(&mut self) -> io::Result<JobStatus>;

    /// Resolve once the job has exited (or its status can no longer be
    /// awaited). Used by `WaitMode::Notify` to suspend until any job finishes;
    /// the exit itself is still picked up by `try_status`.
    ///
    /// Must be cancel safe: the supervisor drops this future whenever another
    /// job finishes first.
    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Stop the job and close its log.
    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>>;
}

/// Starts one job per work item.
pub trait ProcessLauncher: Send {
    type Job: RunningJob;

    /// Start `item`. Failures are per item and never abort the batch.
    fn launch(&mut self, item: WorkItem) -> Result<Self::Job, LaunchError>;
}
