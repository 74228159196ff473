// src/exec/job.rs

//! A running external process plus the log file its output goes to.

use std::fs::File;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::ExitStatus;

use tokio::process::Child;
use tracing::{debug, warn};

use crate::engine::JobStatus;
use crate::exec::backend::RunningJob;
use crate::worklist::WorkItem;

/// Live pairing of one work item, its child process and its log file.
///
/// The child writes to its own duplicates of the log descriptor; the handle
/// keeps the original open until the exit is observed and then closes it.
#[derive(Debug)]
pub struct JobHandle {
    item: WorkItem,
    display_name: String,
    log_path: PathBuf,
    child: Child,
    log: Option<File>,
    exit: Option<i32>,
}

impl JobHandle {
    pub(crate) fn new(item: WorkItem, child: Child, log: File) -> Self {
        Self {
            display_name: item.display_name(),
            log_path: item.log_path(),
            item,
            child,
            log: Some(log),
            exit: None,
        }
    }

    fn record_exit(&mut self, status: ExitStatus) -> i32 {
        let code = status.code().unwrap_or(-1);
        self.exit = Some(code);
        self.close_log();
        debug!(job = %self.display_name, exit_code = code, "job exited; log closed");
        code
    }

    fn close_log(&mut self) {
        if let Some(mut log) = self.log.take() {
            if let Err(e) = log.flush() {
                warn!(
                    job = %self.display_name,
                    log = %self.log_path.display(),
                    error = %e,
                    "failed to flush job log"
                );
            }
        }
    }
}

impl RunningJob for JobHandle {
    fn item(&self) -> &WorkItem {
        &self.item
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn try_status(&mut self) -> io::Result<JobStatus> {
        if let Some(code) = self.exit {
            return Ok(JobStatus::Exited(code));
        }

        match self.child.try_wait()? {
            Some(status) => Ok(JobStatus::Exited(self.record_exit(status))),
            None => Ok(JobStatus::Running),
        }
    }

    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.exit.is_some() {
                return;
            }
            // The status is cached by the child; `try_status` picks it up.
            if let Err(e) = self.child.wait().await {
                debug!(job = %self.display_name, error = %e, "waiting on job failed");
            }
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let result = match self.exit {
                Some(_) => Ok(()),
                None => self.child.kill().await,
            };
            if result.is_ok() && self.exit.is_none() {
                self.exit = Some(-1);
            }
            self.close_log();
            result
        })
    }
}
