// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{DateValue, WaitMode};

/// Concurrency ceiling used when `max_workers` is missing or not positive.
pub const DEFAULT_MAX_WORKERS: usize = 2;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [batch]
/// batch = 3
/// date = "20240115"
/// batch_name = "batch{batch}_{date}"
/// staging_root = "/aspera/staging"
/// stage_dir_prefix = "{batch_name}_"
/// manifest = "vcfs.csv"
///
/// [supervisor]
/// max_workers = 2
/// command = ["python3", "bgzip_md5.py", "-d"]
/// ```
///
/// Nothing here is rendered or checked yet; see [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub batch: BatchSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[batch]` section. String fields may contain `{key}` placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSection {
    /// Batch number; rendered zero-padded to two digits.
    #[serde(default)]
    pub batch: u32,

    #[serde(default)]
    pub date: DateValue,

    #[serde(default = "default_batch_name")]
    pub batch_name: String,

    /// Optional directory holding the source VCFs; created if missing.
    #[serde(default)]
    pub source_root: Option<String>,

    #[serde(default = "default_staging_root")]
    pub staging_root: String,

    #[serde(default = "default_stage_dir_prefix")]
    pub stage_dir_prefix: String,

    /// CSV manifest with SNP and indel path columns.
    #[serde(default)]
    pub manifest: Option<String>,
}

fn default_batch_name() -> String {
    "batch{batch}_{date}".to_string()
}

fn default_staging_root() -> String {
    "staging".to_string()
}

fn default_stage_dir_prefix() -> String {
    "{batch_name}_".to_string()
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            batch: 0,
            date: DateValue::default(),
            batch_name: default_batch_name(),
            source_root: None,
            staging_root: default_staging_root(),
            stage_dir_prefix: default_stage_dir_prefix(),
            manifest: None,
        }
    }
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// Signed on purpose: zero or negative values are clamped, not rejected.
    #[serde(default)]
    pub max_workers: Option<i64>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub wait_mode: WaitMode,

    #[serde(default = "default_max_poll_errors")]
    pub max_poll_errors: u32,

    /// External tool and its fixed flags. The destination directory and the
    /// source path are appended to this list for every work item.
    #[serde(default)]
    pub command: Vec<String>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_errors() -> u32 {
    3
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            max_workers: None,
            poll_interval_ms: default_poll_interval_ms(),
            wait_mode: WaitMode::default(),
            max_poll_errors: default_max_poll_errors(),
            command: Vec::new(),
        }
    }
}

/// Validated configuration with all batch templates rendered.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub batch: BatchInfo,
    pub supervisor: SupervisorConfig,
    pub command: Vec<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        batch: BatchInfo,
        supervisor: SupervisorConfig,
        command: Vec<String>,
    ) -> Self {
        Self {
            batch,
            supervisor,
            command,
        }
    }
}

/// Rendered `[batch]` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInfo {
    /// Zero-padded batch number, e.g. `"03"`.
    pub batch: String,
    pub date: String,
    pub batch_name: String,
    pub source_root: Option<PathBuf>,
    pub staging_root: PathBuf,
    pub stage_dir_prefix: String,
    pub manifest: Option<PathBuf>,
}

/// Immutable settings handed to the supervisor at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub max_workers: usize,
    pub poll_interval: Duration,
    pub wait_mode: WaitMode,
    pub max_poll_errors: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            wait_mode: WaitMode::default(),
            max_poll_errors: default_max_poll_errors(),
        }
    }
}

impl SupervisorConfig {
    /// Replace the concurrency ceiling, clamping non-positive values.
    pub fn with_max_workers(mut self, requested: i64) -> Self {
        self.max_workers = clamp_max_workers(Some(requested));
        self
    }
}

/// Map a configured `max_workers` to a usable ceiling.
///
/// Missing, zero and negative values all fall back to
/// [`DEFAULT_MAX_WORKERS`] so the active set can never be zero-width.
pub fn clamp_max_workers(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => DEFAULT_MAX_WORKERS,
    }
}
