// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; templates are not rendered and
/// nothing is validated. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file, render the `[batch]` templates and validate
/// the `[supervisor]` section.
///
/// A relative `manifest` path is resolved against the directory holding the
/// config file, so the tool can be started from anywhere.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = ConfigFile::try_from(raw_config)?;

    if let Some(manifest) = config.batch.manifest.take() {
        config.batch.manifest = Some(resolve_relative(path, manifest));
    }

    Ok(config)
}

/// Default config location: `vcf_batch.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("vcf_batch.toml")
}

fn resolve_relative(config_path: &Path, target: PathBuf) -> PathBuf {
    if target.is_absolute() {
        return target;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(target),
        _ => target,
    }
}
