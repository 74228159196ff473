// src/engine/core.rs

//! Pure supervisor bookkeeping.
//!
//! `SupervisorCore` owns the FIFO backlog, the slot accounting for the active
//! set and the outcome sequence. It has no channels, no Tokio types and
//! performs no IO: the async shell (`engine::supervisor::Supervisor`) asks
//! it which item to launch next and reports back what each status check
//! observed. This keeps every ordering and ceiling rule testable with plain
//! function calls.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::{SupervisorConfig, DEFAULT_MAX_WORKERS};
use crate::engine::{JobId, Outcome, OutcomeStatus};
use crate::worklist::WorkItem;

/// What a single status check on an active job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Running,
    Exited(i32),
    /// The status could not be queried at all.
    Error(String),
}

/// What the shell must do with a job handle after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapAction {
    /// Still running (or status temporarily unavailable); keep polling.
    Keep,
    /// Exited; drop the handle. The outcome is already recorded.
    Reap,
    /// Status unavailable too many times in a row; kill and drop the handle.
    /// The outcome is already recorded.
    Abandon,
}

#[derive(Debug)]
struct ActiveEntry {
    display_name: String,
    log_path: PathBuf,
    poll_errors: u32,
}

#[derive(Debug)]
pub struct SupervisorCore {
    backlog: VecDeque<(JobId, WorkItem)>,
    active: BTreeMap<JobId, ActiveEntry>,
    outcomes: Vec<Outcome>,
    max_workers: usize,
    max_poll_errors: u32,
    peak_active: usize,
}

impl SupervisorCore {
    pub fn new(worklist: Vec<WorkItem>, config: &SupervisorConfig) -> Self {
        let max_workers = if config.max_workers == 0 {
            DEFAULT_MAX_WORKERS
        } else {
            config.max_workers
        };

        Self {
            backlog: worklist.into_iter().enumerate().collect(),
            active: BTreeMap::new(),
            outcomes: Vec::new(),
            max_workers,
            max_poll_errors: config.max_poll_errors.max(1),
            peak_active: 0,
        }
    }

    /// Pop the front of the backlog if a slot is free.
    ///
    /// The returned item already holds its slot: the caller must follow up
    /// with either a status [`observe`](Self::observe) loop or
    /// [`launch_failed`](Self::launch_failed).
    pub fn next_launch(&mut self) -> Option<(JobId, WorkItem)> {
        if self.active.len() >= self.max_workers {
            return None;
        }

        let (id, item) = self.backlog.pop_front()?;
        self.active.insert(
            id,
            ActiveEntry {
                display_name: item.display_name(),
                log_path: item.log_path(),
                poll_errors: 0,
            },
        );
        self.peak_active = self.peak_active.max(self.active.len());

        Some((id, item))
    }

    /// Release the slot reserved by `next_launch` and record a terminal
    /// `LaunchFailed` outcome.
    pub fn launch_failed(&mut self, id: JobId, reason: String) {
        match self.active.remove(&id) {
            Some(entry) => self.record(id, entry, OutcomeStatus::LaunchFailed(reason)),
            None => warn!(job_id = id, "launch failure reported for unknown job"),
        }
    }

    /// Feed one status check result for an active job.
    pub fn observe(&mut self, id: JobId, observation: Observation) -> ReapAction {
        let max_poll_errors = self.max_poll_errors;
        let Some(entry) = self.active.get_mut(&id) else {
            warn!(job_id = id, "status reported for unknown job; dropping handle");
            return ReapAction::Reap;
        };

        match observation {
            Observation::Running => {
                entry.poll_errors = 0;
                ReapAction::Keep
            }
            Observation::Exited(code) => {
                let status = if code == 0 {
                    OutcomeStatus::Success
                } else {
                    OutcomeStatus::Failed(code)
                };
                self.finish(id, status);
                ReapAction::Reap
            }
            Observation::Error(reason) => {
                entry.poll_errors += 1;
                if entry.poll_errors < max_poll_errors {
                    debug!(
                        job_id = id,
                        attempt = entry.poll_errors,
                        error = %reason,
                        "status check failed; treating job as still running"
                    );
                    return ReapAction::Keep;
                }

                let attempts = entry.poll_errors;
                self.finish(
                    id,
                    OutcomeStatus::LaunchFailed(format!(
                        "status unavailable after {attempts} attempts: {reason}"
                    )),
                );
                ReapAction::Abandon
            }
        }
    }

    /// Record an active job as killed by shutdown.
    pub fn cancel(&mut self, id: JobId) {
        self.finish(id, OutcomeStatus::Failed(-1));
    }

    /// Remove every item that was never launched, in submission order.
    pub fn drain_backlog(&mut self) -> Vec<WorkItem> {
        self.backlog.drain(..).map(|(_, item)| item).collect()
    }

    /// Backlog and active set are both empty.
    pub fn is_done(&self) -> bool {
        self.backlog.is_empty() && self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_ids(&self) -> Vec<JobId> {
        self.active.keys().copied().collect()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Highest active-set size seen so far.
    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }

    fn finish(&mut self, id: JobId, status: OutcomeStatus) {
        if let Some(entry) = self.active.remove(&id) {
            self.record(id, entry, status);
        }
    }

    fn record(&mut self, id: JobId, entry: ActiveEntry, status: OutcomeStatus) {
        self.outcomes.push(Outcome {
            job_id: id,
            display_name: entry.display_name,
            status,
            log_path: entry.log_path,
        });
    }
}
