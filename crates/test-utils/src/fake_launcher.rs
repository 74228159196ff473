use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use vcf_batch::engine::JobStatus;
use vcf_batch::errors::LaunchError;
use vcf_batch::exec::{ProcessLauncher, RunningJob};
use vcf_batch::worklist::WorkItem;

/// How a fake job behaves, keyed by the item's display name.
#[derive(Debug, Clone)]
pub struct FakeScript {
    pub exit_code: i32,
    pub runtime: Duration,
    pub launch_error: Option<String>,
    /// Number of status checks that fail before the job answers normally.
    pub poll_errors: u32,
}

impl FakeScript {
    pub fn exits(exit_code: i32) -> Self {
        Self {
            exit_code,
            runtime: Duration::from_millis(10),
            launch_error: None,
            poll_errors: 0,
        }
    }

    pub fn after(mut self, runtime: Duration) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn launch_error(reason: &str) -> Self {
        Self {
            launch_error: Some(reason.to_string()),
            ..Self::exits(0)
        }
    }

    pub fn poll_errors(mut self, n: u32) -> Self {
        self.poll_errors = n;
        self
    }
}

/// Shared record of what the fake launcher saw.
#[derive(Debug, Default)]
pub struct FakeLedger {
    /// Display names in launch order.
    pub launched: Vec<String>,
    /// Display names in the order their exit was observed.
    pub reaped: Vec<String>,
    pub killed: Vec<String>,
    pub active: usize,
    pub peak_active: usize,
}

/// A launcher that never spawns anything:
/// - records which items were launched and when they were reaped
/// - tracks how many jobs are live at once
/// - exits each job after its scripted runtime with its scripted code
pub struct FakeLauncher {
    default: FakeScript,
    scripts: HashMap<String, FakeScript>,
    ledger: Arc<Mutex<FakeLedger>>,
}

impl FakeLauncher {
    pub fn new(default: FakeScript) -> Self {
        Self {
            default,
            scripts: HashMap::new(),
            ledger: Arc::new(Mutex::new(FakeLedger::default())),
        }
    }

    pub fn with_script(mut self, name: &str, script: FakeScript) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    pub fn ledger(&self) -> Arc<Mutex<FakeLedger>> {
        Arc::clone(&self.ledger)
    }
}

impl ProcessLauncher for FakeLauncher {
    type Job = FakeJob;

    fn launch(&mut self, item: WorkItem) -> Result<FakeJob, LaunchError> {
        let name = item.display_name();
        let script = self.scripts.get(&name).unwrap_or(&self.default).clone();

        if let Some(reason) = script.launch_error {
            return Err(LaunchError::Spawn {
                program: "fake".to_string(),
                source: io::Error::other(reason),
            });
        }

        {
            let mut ledger = self.ledger.lock().unwrap();
            ledger.launched.push(name.clone());
            ledger.active += 1;
            ledger.peak_active = ledger.peak_active.max(ledger.active);
        }

        Ok(FakeJob {
            log_path: item.log_path(),
            item,
            name,
            deadline: Instant::now() + script.runtime,
            exit_code: script.exit_code,
            poll_errors_left: script.poll_errors,
            done: false,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

pub struct FakeJob {
    item: WorkItem,
    name: String,
    log_path: PathBuf,
    deadline: Instant,
    exit_code: i32,
    poll_errors_left: u32,
    done: bool,
    ledger: Arc<Mutex<FakeLedger>>,
}

impl RunningJob for FakeJob {
    fn item(&self) -> &WorkItem {
        &self.item
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn try_status(&mut self) -> io::Result<JobStatus> {
        if self.done {
            return Ok(JobStatus::Exited(self.exit_code));
        }
        if self.poll_errors_left > 0 {
            self.poll_errors_left -= 1;
            return Err(io::Error::other("fake status failure"));
        }
        if Instant::now() < self.deadline {
            return Ok(JobStatus::Running);
        }

        self.done = true;
        let mut ledger = self.ledger.lock().unwrap();
        ledger.active -= 1;
        ledger.reaped.push(self.name.clone());
        Ok(JobStatus::Exited(self.exit_code))
    }

    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let deadline = self.deadline;
        Box::pin(async move {
            tokio::time::sleep_until(deadline).await;
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            if !self.done {
                self.done = true;
                self.exit_code = -1;
                let mut ledger = self.ledger.lock().unwrap();
                ledger.active -= 1;
                ledger.killed.push(self.name.clone());
            }
            Ok(())
        })
    }
}
