// src/config/mod.rs

//! Configuration loading and validation for vcf-batch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Expand `{key}` placeholders in the `[batch]` section (`template.rs`).
//! - Validate and clamp supervisor settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod template;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    clamp_max_workers, BatchInfo, BatchSection, ConfigFile, RawConfigFile, SupervisorConfig,
    SupervisorSection, DEFAULT_MAX_WORKERS,
};
