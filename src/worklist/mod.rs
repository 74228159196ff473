// src/worklist/mod.rs

//! Worklist construction.
//!
//! The supervisor only ever sees an ordered `Vec<WorkItem>`. This module
//! builds that list from a batch config plus either a CSV manifest or a
//! pairs file, and prepares the batch root directories.

pub mod item;
pub mod manifest;

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::BatchInfo;
use crate::errors::Result;

pub use item::WorkItem;
pub use manifest::{load_manifest, parse_manifest, parse_pairs, read_pairs, Manifest};

/// `<staging_root>/<stage_dir_prefix>snp`
pub fn snp_destination(batch: &BatchInfo) -> PathBuf {
    batch
        .staging_root
        .join(format!("{}snp", batch.stage_dir_prefix))
}

/// `<staging_root>/<stage_dir_prefix>indel`
pub fn indel_destination(batch: &BatchInfo) -> PathBuf {
    batch
        .staging_root
        .join(format!("{}indel", batch.stage_dir_prefix))
}

/// Turn a manifest into work items: every SNP file in row order, then every
/// indel file in row order.
///
/// Unequal SNP and indel counts usually mean a broken manifest row, but the
/// files that are listed are still worth processing, so this only warns.
pub fn build_from_manifest(manifest: &Manifest, batch: &BatchInfo) -> Vec<WorkItem> {
    let snp_count = manifest.snp_paths.len();
    let indel_count = manifest.indel_paths.len();

    if snp_count == indel_count {
        info!(count = snp_count, "manifest SNP and indel counts match");
    } else {
        warn!(
            snp = snp_count,
            indel = indel_count,
            "manifest SNP and indel counts differ"
        );
    }

    let snp_dir = snp_destination(batch);
    let indel_dir = indel_destination(batch);

    manifest
        .snp_paths
        .iter()
        .map(|p| WorkItem::new(p.clone(), snp_dir.clone()))
        .chain(
            manifest
                .indel_paths
                .iter()
                .map(|p| WorkItem::new(p.clone(), indel_dir.clone())),
        )
        .collect()
}

/// Create `staging_root` and, if configured, `source_root`.
pub fn prepare_roots(batch: &BatchInfo) -> Result<()> {
    fs::create_dir_all(&batch.staging_root)?;
    if let Some(source_root) = &batch.source_root {
        fs::create_dir_all(source_root)?;
    }
    Ok(())
}
