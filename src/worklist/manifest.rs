// src/worklist/manifest.rs

//! Parsing of the two worklist inputs:
//!
//! - the CSV manifest with one SNP and one indel VCF path per row
//! - a plain pairs file with `source destination` on each line

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::errors::{BatchError, Result};
use crate::worklist::WorkItem;

const SNP_COLUMNS: &[&str] = &["snp_vcf_path", "snp_path"];
const INDEL_COLUMNS: &[&str] = &["indel_vcf_path", "indel_path"];

/// SNP and indel paths listed in a manifest, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub snp_paths: Vec<PathBuf>,
    pub indel_paths: Vec<PathBuf>,
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        BatchError::ManifestError(format!("cannot read '{}': {e}", path.display()))
    })?;
    parse_manifest(&contents)
}

/// Parse a header-led CSV manifest.
///
/// Header names are trimmed and matched case-insensitively; both the
/// `*_vcf_path` and the short `*_path` spellings are accepted. Quoted cells
/// may contain commas. Blank cells are skipped, so a row may carry only one
/// of the two paths.
pub fn parse_manifest(contents: &str) -> Result<Manifest> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(BatchError::ManifestError("manifest is empty".to_string()));
    }

    let snp_idx = find_column(&columns, SNP_COLUMNS)?;
    let indel_idx = find_column(&columns, INDEL_COLUMNS)?;

    let mut manifest = Manifest::default();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if let Some(cell) = record.get(snp_idx).filter(|c| !c.is_empty()) {
            manifest.snp_paths.push(PathBuf::from(cell));
        }
        if let Some(cell) = record.get(indel_idx).filter(|c| !c.is_empty()) {
            manifest.indel_paths.push(PathBuf::from(cell));
        }
        if record.len() <= snp_idx.max(indel_idx) {
            let line = record.position().map(|p| p.line());
            debug!(?line, "manifest row is shorter than its header");
        }
    }

    Ok(manifest)
}

fn csv_error(e: csv::Error) -> BatchError {
    BatchError::ManifestError(format!("malformed CSV: {e}"))
}

fn find_column(columns: &[String], accepted: &[&str]) -> Result<usize> {
    columns
        .iter()
        .position(|c| accepted.contains(&c.as_str()))
        .ok_or_else(|| {
            BatchError::ManifestError(format!(
                "manifest header has no {} column (found: {})",
                accepted.join(" / "),
                columns.join(", ")
            ))
        })
}

/// Read a pairs file, or stdin when `path` is `-`.
pub async fn read_pairs(path: impl AsRef<Path>) -> Result<Vec<WorkItem>> {
    let path = path.as_ref();
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            BatchError::ManifestError(format!("cannot read '{}': {e}", path.display()))
        })?
    };
    parse_pairs(&contents)
}

/// Parse `source destination` lines.
///
/// Blank lines and lines starting with `#` are ignored. Anything other than
/// exactly two whitespace-separated fields is an error naming the line.
pub fn parse_pairs(contents: &str) -> Result<Vec<WorkItem>> {
    let mut items = Vec::new();

    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [source, destination] => items.push(WorkItem::new(*source, *destination)),
            _ => {
                return Err(BatchError::ManifestError(format!(
                    "line {}: expected 'source destination', got '{}'",
                    idx + 1,
                    line
                )));
            }
        }
    }

    Ok(items)
}
