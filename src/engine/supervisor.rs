// src/engine/supervisor.rs

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use futures::future::select_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::exec::{ProcessLauncher, RunningJob};
use crate::types::WaitMode;
use crate::worklist::WorkItem;

use super::core::{Observation, ReapAction, SupervisorCore};
use super::report::SupervisorReport;
use super::{JobId, JobStatus};

/// Why the supervisor woke up between reap passes.
enum Wake {
    Tick,
    Shutdown,
}

/// Drives a worklist to completion through a `ProcessLauncher`.
///
/// This is the IO shell around [`SupervisorCore`], which holds the backlog,
/// ceiling and outcome rules. One control task runs the whole loop: launch
/// into free slots, check every active job without blocking, reap the ones
/// that exited, then suspend until the next pass.
pub struct Supervisor<L: ProcessLauncher> {
    core: SupervisorCore,
    launcher: L,
    jobs: BTreeMap<JobId, L::Job>,
    wait_mode: WaitMode,
    poll_interval: Duration,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<L: ProcessLauncher> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .field("wait_mode", &self.wait_mode)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> Supervisor<L> {
    pub fn new(worklist: Vec<WorkItem>, config: &SupervisorConfig, launcher: L) -> Self {
        Self {
            core: SupervisorCore::new(worklist, config),
            launcher,
            jobs: BTreeMap::new(),
            wait_mode: config.wait_mode,
            poll_interval: config.poll_interval,
            shutdown: None,
        }
    }

    /// Stop launching and kill every active job once `true` is sent.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run until backlog and active set are both empty, or until shutdown.
    pub async fn run(mut self) -> SupervisorReport {
        info!(
            items = self.core.backlog_len(),
            max_workers = self.core.max_workers(),
            wait_mode = ?self.wait_mode,
            "supervisor started"
        );

        let mut cancelled = false;
        loop {
            self.fill_slots();
            self.reap_pass().await;

            if self.core.is_done() {
                break;
            }

            if self.jobs.is_empty() {
                // Slots were freed by abandoned jobs; refill right away.
                continue;
            }

            if let Wake::Shutdown = self.suspend().await {
                self.cancel_all().await;
                cancelled = true;
                break;
            }
        }

        let not_started = self.core.drain_backlog();
        let report = SupervisorReport {
            peak_active: self.core.peak_active(),
            outcomes: self.core.into_outcomes(),
            not_started,
            cancelled,
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            launch_failed = report.launch_failed(),
            not_started = report.not_started.len(),
            "supervisor finished"
        );
        report
    }

    /// Launch backlog items, front first, while a slot is free.
    fn fill_slots(&mut self) {
        while let Some((id, item)) = self.core.next_launch() {
            let name = item.display_name();
            match self.launcher.launch(item) {
                Ok(job) => {
                    info!(job = %name, job_id = id, "job launched");
                    self.jobs.insert(id, job);
                }
                Err(e) => {
                    warn!(job = %name, job_id = id, error = %e, "job failed to launch");
                    self.core.launch_failed(id, e.to_string());
                }
            }
        }
        debug!(
            active = self.core.active_count(),
            backlog = self.core.backlog_len(),
            "slots filled"
        );
    }

    /// Check every active job once; exited jobs are collected first and only
    /// removed after the whole active set has been inspected.
    async fn reap_pass(&mut self) {
        let mut finished = Vec::new();

        for (id, job) in self.jobs.iter_mut() {
            let observation = match job.try_status() {
                Ok(JobStatus::Running) => Observation::Running,
                Ok(JobStatus::Exited(code)) => Observation::Exited(code),
                Err(e) => Observation::Error(e.to_string()),
            };

            match self.core.observe(*id, observation.clone()) {
                ReapAction::Keep => {}
                action => finished.push((*id, action, observation)),
            }
        }

        for (id, action, observation) in finished {
            let Some(mut job) = self.jobs.remove(&id) else {
                continue;
            };
            let name = job.item().display_name();

            match (action, observation) {
                (ReapAction::Abandon, _) => {
                    warn!(job = %name, job_id = id, "job status unavailable; killing it");
                    if let Err(e) = job.kill().await {
                        warn!(job = %name, job_id = id, error = %e, "failed to kill job");
                    }
                }
                (_, Observation::Exited(0)) => {
                    info!(job = %name, job_id = id, "job succeeded");
                }
                (_, Observation::Exited(code)) => {
                    warn!(
                        job = %name,
                        job_id = id,
                        exit_code = code,
                        log = %job.log_path().display(),
                        "job failed"
                    );
                }
                _ => {}
            }
        }
    }

    /// Wait for the next pass: a fixed interval in `Poll` mode, the first
    /// job exit in `Notify` mode. Either way a shutdown request wins.
    async fn suspend(&mut self) -> Wake {
        let shutdown = &mut self.shutdown;
        match self.wait_mode {
            WaitMode::Poll => {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => Wake::Tick,
                    _ = shutdown_requested(shutdown) => Wake::Shutdown,
                }
            }
            WaitMode::Notify => {
                let exits = select_all(self.jobs.values_mut().map(|job| job.wait_exit()));
                tokio::select! {
                    _ = exits => Wake::Tick,
                    _ = shutdown_requested(shutdown) => Wake::Shutdown,
                }
            }
        }
    }

    /// Settle every active job on shutdown. A job whose exit is already
    /// observable keeps its real outcome; only jobs still running (or whose
    /// status cannot be read) are killed and recorded as cancelled.
    async fn cancel_all(&mut self) {
        info!(
            active = self.jobs.len(),
            backlog = self.core.backlog_len(),
            "shutdown requested; killing active jobs"
        );

        let jobs = std::mem::take(&mut self.jobs);
        for (id, mut job) in jobs {
            let name = job.item().display_name();
            match job.try_status() {
                Ok(JobStatus::Exited(code)) => {
                    debug!(job = %name, job_id = id, exit_code = code, "job exited before shutdown");
                    self.core.observe(id, Observation::Exited(code));
                    continue;
                }
                Ok(JobStatus::Running) => {}
                Err(e) => {
                    debug!(job = %name, job_id = id, error = %e, "status unreadable at shutdown");
                }
            }

            if let Err(e) = job.kill().await {
                warn!(job = %name, job_id = id, error = %e, "failed to kill job on shutdown");
            }
            self.core.cancel(id);
        }
    }
}

/// Resolves once `true` has been published. Never resolves when there is no
/// shutdown channel or its sender is gone.
async fn shutdown_requested(rx: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };

    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}
