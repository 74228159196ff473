// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the `ProcessLauncher` / `RunningJob` seam the
//!   supervisor is written against.
//! - [`launcher`] is the production `CommandLauncher`, which prepares the
//!   destination directory and log file and spawns the external tool.
//! - [`job`] is the `JobHandle` it returns: child process plus log file,
//!   with non-blocking status inspection.

pub mod backend;
pub mod job;
pub mod launcher;

pub use backend::{ProcessLauncher, RunningJob};
pub use job::JobHandle;
pub use launcher::CommandLauncher;
