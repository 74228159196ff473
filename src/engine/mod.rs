// src/engine/mod.rs

//! Bounded-concurrency job supervisor.
//!
//! The pure bookkeeping (backlog, slot accounting, outcome sequence) lives in
//! [`core`]; the async shell that launches processes, polls them and waits
//! between passes is [`supervisor`]. [`report`] formats the final result.

use std::path::PathBuf;

/// Supervisor-local job identifier: the item's index in the submitted
/// worklist.
pub type JobId = usize;

/// Answer of a non-blocking status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    /// Process exit code; `-1` when the process was killed by a signal.
    Exited(i32),
}

/// Terminal status of one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failed(i32),
    LaunchFailed(String),
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }
}

/// Recorded result of one work item, in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub job_id: JobId,
    pub display_name: String,
    pub status: OutcomeStatus,
    pub log_path: PathBuf,
}

pub mod core;
pub mod report;
pub mod supervisor;

pub use self::core::{Observation, ReapAction, SupervisorCore};
pub use report::SupervisorReport;
pub use supervisor::Supervisor;
