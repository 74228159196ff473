// src/errors.rs

//! Crate-wide error types.
//!
//! [`BatchError`] covers everything that aborts a whole run before the
//! supervisor starts (config, templating, manifest, IO). [`LaunchError`] is
//! per work item and never aborts the batch; the supervisor turns it into a
//! `launch-failed` outcome.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a single work item could not be started.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("source file '{path}' is not readable: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create destination directory '{path}': {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open log file '{path}': {source}")]
    OpenLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BatchError>;
