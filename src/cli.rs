// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::WaitMode;

/// Command-line arguments for `vcf-batch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vcf-batch",
    version,
    about = "Compress and checksum a batch of VCFs with a bounded number of concurrent jobs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the batch config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Read `source destination` pairs from this file (`-` for stdin)
    /// instead of the manifest named in the config.
    #[arg(long, value_name = "PATH")]
    pub worklist: Option<String>,

    /// Override `[supervisor].max_workers`. Values <= 0 fall back to 2.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_workers: Option<i64>,

    /// Override `[supervisor].wait_mode` (poll or notify).
    #[arg(long, value_name = "MODE")]
    pub wait_mode: Option<WaitMode>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VCF_BATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and worklist, print them, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_parse() {
        let args = CliArgs::try_parse_from([
            "vcf-batch",
            "--max-workers",
            "-1",
            "--wait-mode",
            "notify",
            "--worklist",
            "-",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("vcf_batch.toml"));
        assert_eq!(args.max_workers, Some(-1));
        assert_eq!(args.wait_mode, Some(WaitMode::Notify));
        assert_eq!(args.worklist.as_deref(), Some("-"));
    }
}
