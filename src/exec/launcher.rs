// src/exec/launcher.rs

//! Production launcher on top of `tokio::process::Command`.

use std::fs::{self, File};
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::errors::{BatchError, LaunchError, Result};
use crate::exec::backend::ProcessLauncher;
use crate::exec::job::JobHandle;
use crate::worklist::WorkItem;

/// Runs `<command...> <destination_dir> <source_path>` for every work item,
/// with stdout and stderr both sent to `<destination_dir>/<name>.log`.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    fixed_args: Vec<String>,
}

impl CommandLauncher {
    /// `command[0]` is the program, the rest are fixed leading arguments.
    pub fn new(command: Vec<String>) -> Result<Self> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| BatchError::ConfigError("launcher command is empty".to_string()))?;

        Ok(Self {
            program,
            fixed_args: parts.collect(),
        })
    }
}

impl ProcessLauncher for CommandLauncher {
    type Job = JobHandle;

    fn launch(&mut self, item: WorkItem) -> std::result::Result<JobHandle, LaunchError> {
        let source = item.source_path();
        let destination = item.destination_dir();

        // Opening the file (not just stat-ing it) also proves it is readable.
        let readable = File::open(source).and_then(|f| {
            if f.metadata()?.is_file() {
                Ok(())
            } else {
                Err(std::io::Error::other("not a regular file"))
            }
        });
        readable.map_err(|e| LaunchError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?;

        fs::create_dir_all(destination).map_err(|e| LaunchError::CreateDestination {
            path: destination.to_path_buf(),
            source: e,
        })?;

        let log_path = item.log_path();
        let open_log = |path: &std::path::Path| {
            let log = File::create(path)?;
            let stdout = log.try_clone()?;
            let stderr = log.try_clone()?;
            Ok::<_, std::io::Error>((log, stdout, stderr))
        };
        let (log, stdout, stderr) = open_log(&log_path).map_err(|e| LaunchError::OpenLog {
            path: log_path.clone(),
            source: e,
        })?;

        let child = Command::new(&self.program)
            .args(&self.fixed_args)
            .arg(destination)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        info!(
            job = %item.display_name(),
            pid = child.id(),
            log = %log_path.display(),
            "started job process"
        );

        Ok(JobHandle::new(item, child, log))
    }
}
