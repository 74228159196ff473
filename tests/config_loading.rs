// tests/config_loading.rs

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};
use vcf_batch::config::{load_and_validate, DEFAULT_MAX_WORKERS};
use vcf_batch::errors::BatchError;
use vcf_batch::types::WaitMode;

#[test]
fn full_config_is_rendered_and_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vcf_batch.toml");
    fs::write(
        &path,
        r#"
[batch]
batch = 7
date = 20240115
batch_name = "hgsc_b{batch}_{date}"
source_root = "/data/{batch_name}"
staging_root = "/aspera/staging"
stage_dir_prefix = "{batch_name}_"
manifest = "{batch_name}.csv"

[supervisor]
max_workers = 4
poll_interval_ms = 250
wait_mode = "notify"
max_poll_errors = 5
command = ["python3", "bgzip_md5.py", "-d"]
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.batch.batch, "07");
    assert_eq!(cfg.batch.batch_name, "hgsc_b07_20240115");
    assert_eq!(
        cfg.batch.source_root,
        Some(PathBuf::from("/data/hgsc_b07_20240115"))
    );
    assert_eq!(cfg.batch.stage_dir_prefix, "hgsc_b07_20240115_");
    // Relative manifest paths resolve next to the config file.
    assert_eq!(
        cfg.batch.manifest,
        Some(dir.path().join("hgsc_b07_20240115.csv"))
    );

    assert_eq!(cfg.supervisor.max_workers, 4);
    assert_eq!(cfg.supervisor.poll_interval, Duration::from_millis(250));
    assert_eq!(cfg.supervisor.wait_mode, WaitMode::Notify);
    assert_eq!(cfg.supervisor.max_poll_errors, 5);
    assert_eq!(cfg.command, vec!["python3", "bgzip_md5.py", "-d"]);
}

#[test]
fn minimal_config_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[supervisor]
command = ["bgzip_md5"]
max_workers = 0
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.supervisor.max_workers, DEFAULT_MAX_WORKERS);
    assert_eq!(cfg.supervisor.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.supervisor.wait_mode, WaitMode::Poll);
    assert_eq!(cfg.batch.staging_root, PathBuf::from("staging"));
    assert!(cfg.batch.manifest.is_none());
}

#[test]
fn missing_command_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[supervisor]\nmax_workers = 2\n").unwrap();

    match load_and_validate(file.path()) {
        Err(BatchError::ConfigError(msg)) => assert!(msg.contains("command")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_wait_mode_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "[supervisor]\ncommand = [\"x\"]\nwait_mode = \"epoll\"\n"
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(BatchError::TomlError(_))
    ));
}

#[test]
fn unknown_placeholder_returns_template_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "[batch]\nstaging_root = \"/stage/{{batchname}}\"\n[supervisor]\ncommand = [\"x\"]\n"
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(BatchError::TemplateError(msg)) => assert!(msg.contains("batchname")),
        other => panic!("Expected TemplateError, got: {:?}", other),
    }
}

#[test]
fn missing_file_returns_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("nope.toml")),
        Err(BatchError::IoError(_))
    ));
}
