// src/engine/report.rs

use std::fmt;

use crate::engine::{Outcome, OutcomeStatus};
use crate::worklist::WorkItem;

/// Everything a supervisor run produced.
#[derive(Debug, Clone, Default)]
pub struct SupervisorReport {
    /// One entry per launched or failed-to-launch item, in completion order.
    pub outcomes: Vec<Outcome>,
    /// Items still in the backlog when a shutdown stopped the run.
    pub not_started: Vec<WorkItem>,
    /// Whether the run was stopped by a shutdown request.
    pub cancelled: bool,
    /// Largest number of jobs that were active at the same time.
    pub peak_active: usize,
}

impl SupervisorReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Success))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    pub fn launch_failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::LaunchFailed(_)))
    }

    /// True when every item ran and exited 0.
    pub fn all_succeeded(&self) -> bool {
        self.not_started.is_empty() && self.outcomes.iter().all(|o| o.status.is_success())
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Failed(code) => write!(f, "failed({code})"),
            OutcomeStatus::LaunchFailed(reason) => write!(f, "launch-failed({reason})"),
        }
    }
}

impl fmt::Display for SupervisorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(
                f,
                "{:<8} {}  [{}]",
                short_label(&outcome.status),
                outcome.display_name,
                outcome.log_path.display()
            )?;
            if let OutcomeStatus::LaunchFailed(reason) = &outcome.status {
                writeln!(f, "         {reason}")?;
            }
        }
        for item in &self.not_started {
            writeln!(f, "{:<8} {}", "SKIPPED", item.display_name())?;
        }

        writeln!(
            f,
            "{} succeeded, {} failed, {} launch-failed, {} not started{}",
            self.succeeded(),
            self.failed(),
            self.launch_failed(),
            self.not_started.len(),
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

fn short_label(status: &OutcomeStatus) -> String {
    match status {
        OutcomeStatus::Success => "OK".to_string(),
        OutcomeStatus::Failed(code) => format!("FAIL({code})"),
        OutcomeStatus::LaunchFailed(_) => "NOSTART".to_string(),
    }
}
