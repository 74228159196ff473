// src/logging.rs

//! Log filtering for `vcf-batch`.
//!
//! The chosen level applies to this crate's own events (supervisor, launcher,
//! worklist). Dependencies such as tokio stay at `warn` so a `--log-level
//! trace` run is not flooded by runtime internals.
//!
//! Where the level comes from, first match wins:
//! 1. `--log-level`
//! 2. `VCF_BATCH_LOG`, either a bare level (`debug`) or a full filter
//!    directive (`vcf_batch::engine=trace,tokio=debug`)
//! 3. `info`
//!
//! Logs go to stderr; stdout carries only the final report.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "VCF_BATCH_LOG";

/// Level for everything outside this crate.
const DEPENDENCY_LEVEL: &str = "warn";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(crate_filter(level_name(level)));
    }

    let Some(spec) = env.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(crate_filter("info"));
    };

    match parse_level_str(spec) {
        Some(level) => Ok(crate_filter(level)),
        None => EnvFilter::try_new(spec)
            .map_err(|e| anyhow!("invalid {LOG_ENV} value '{spec}': {e}")),
    }
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{DEPENDENCY_LEVEL},vcf_batch={level}"))
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
