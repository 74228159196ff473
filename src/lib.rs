// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod worklist;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{clamp_max_workers, load_and_validate, ConfigFile};
use crate::engine::Supervisor;
use crate::errors::BatchError;
use crate::exec::CommandLauncher;
use crate::worklist::{build_from_manifest, load_manifest, prepare_roots, read_pairs, WorkItem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and overrides
/// - worklist construction (manifest or pairs file)
/// - the supervisor with the real command launcher
/// - Ctrl-C handling
///
/// Returns whether every work item succeeded.
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = args.config.clone();
    let mut cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config '{}'", config_path.display()))?;
    apply_overrides(&mut cfg, &args);

    let worklist = build_worklist(&cfg, args.worklist.as_deref()).await?;

    if args.dry_run {
        print_dry_run(&cfg, &worklist);
        return Ok(true);
    }

    prepare_roots(&cfg.batch).context("creating batch root directories")?;
    let launcher = CommandLauncher::new(cfg.command.clone())?;

    // Ctrl-C → kill active jobs, skip the rest of the backlog.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = shutdown_tx.send(true);
    });

    info!(
        batch = %cfg.batch.batch_name,
        items = worklist.len(),
        "starting batch"
    );

    let supervisor =
        Supervisor::new(worklist, &cfg.supervisor, launcher).with_shutdown(shutdown_rx);
    let report = supervisor.run().await;

    print!("{report}");
    Ok(report.all_succeeded())
}

fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some(requested) = args.max_workers {
        cfg.supervisor.max_workers = clamp_max_workers(Some(requested));
    }
    if let Some(mode) = args.wait_mode {
        cfg.supervisor.wait_mode = mode;
    }
}

/// A pairs file given on the command line wins over the config's manifest.
async fn build_worklist(cfg: &ConfigFile, pairs: Option<&str>) -> Result<Vec<WorkItem>> {
    if let Some(path) = pairs {
        debug!(path, "reading worklist pairs");
        return Ok(read_pairs(path).await?);
    }

    let manifest_path = cfg.batch.manifest.as_ref().ok_or_else(|| {
        BatchError::ConfigError(
            "no worklist: set [batch].manifest or pass --worklist".to_string(),
        )
    })?;
    debug!(path = %manifest_path.display(), "reading manifest");

    let manifest = load_manifest(manifest_path)?;
    Ok(build_from_manifest(&manifest, &cfg.batch))
}

/// Simple dry-run output: print the resolved batch and the worklist.
fn print_dry_run(cfg: &ConfigFile, worklist: &[WorkItem]) {
    println!("vcf-batch dry-run");
    println!("  batch_name = {}", cfg.batch.batch_name);
    println!("  staging_root = {}", cfg.batch.staging_root.display());
    if let Some(source_root) = &cfg.batch.source_root {
        println!("  source_root = {}", source_root.display());
    }
    println!("  max_workers = {}", cfg.supervisor.max_workers);
    println!("  wait_mode = {:?}", cfg.supervisor.wait_mode);
    println!("  command = {:?}", cfg.command);
    println!();

    println!("worklist ({}):", worklist.len());
    for item in worklist {
        println!("  - {item}");
        println!("      log: {}", item.log_path().display());
    }

    debug!("dry-run complete (no execution)");
}
