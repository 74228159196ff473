// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    clamp_max_workers, BatchInfo, BatchSection, ConfigFile, RawConfigFile, SupervisorConfig,
    SupervisorSection,
};
use crate::config::template::render;
use crate::errors::{BatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_supervisor_section(&raw.supervisor)?;
        let batch = render_batch(&raw.batch)?;
        let supervisor = supervisor_config(&raw.supervisor);
        Ok(ConfigFile::new_unchecked(batch, supervisor, raw.supervisor.command))
    }
}

fn validate_supervisor_section(section: &SupervisorSection) -> Result<()> {
    if section.command.is_empty() {
        return Err(BatchError::ConfigError(
            "[supervisor].command must name the program to run".to_string(),
        ));
    }

    if section.command[0].trim().is_empty() {
        return Err(BatchError::ConfigError(
            "[supervisor].command[0] must not be blank".to_string(),
        ));
    }

    if section.poll_interval_ms == 0 {
        return Err(BatchError::ConfigError(
            "[supervisor].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if section.max_poll_errors == 0 {
        return Err(BatchError::ConfigError(
            "[supervisor].max_poll_errors must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn supervisor_config(section: &SupervisorSection) -> SupervisorConfig {
    SupervisorConfig {
        max_workers: clamp_max_workers(section.max_workers),
        poll_interval: Duration::from_millis(section.poll_interval_ms),
        wait_mode: section.wait_mode,
        max_poll_errors: section.max_poll_errors,
    }
}

/// Render the `[batch]` templates.
///
/// `batch_name` may only refer to `batch` and `date`; every other field may
/// additionally refer to `batch_name`.
fn render_batch(section: &BatchSection) -> Result<BatchInfo> {
    let batch = format!("{:02}", section.batch);
    let date = section.date.as_text();

    let mut vars = BTreeMap::from([("batch", batch.clone()), ("date", date.clone())]);
    let batch_name = render(&section.batch_name, &vars)?;
    vars.insert("batch_name", batch_name.clone());

    let staging_root = render(&section.staging_root, &vars)?;
    if staging_root.trim().is_empty() {
        return Err(BatchError::ConfigError(
            "[batch].staging_root must not be empty".to_string(),
        ));
    }

    let source_root = section
        .source_root
        .as_deref()
        .map(|s| render(s, &vars).map(PathBuf::from))
        .transpose()?;

    let manifest = section
        .manifest
        .as_deref()
        .map(|s| render(s, &vars).map(PathBuf::from))
        .transpose()?;

    Ok(BatchInfo {
        batch,
        date,
        batch_name,
        source_root,
        staging_root: PathBuf::from(staging_root),
        stage_dir_prefix: render(&section.stage_dir_prefix, &vars)?,
        manifest,
    })
}
