// src/worklist/item.rs

use std::fmt;
use std::path::{Path, PathBuf};

/// One unit of batch work: a source file and the directory its compressed
/// output (and log) goes to.
///
/// Nothing is checked at construction time; whether the source exists is
/// only decided when the item is launched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    source_path: PathBuf,
    destination_dir: PathBuf,
}

impl WorkItem {
    pub fn new(source_path: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_dir: destination_dir.into(),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Base name of the source file. Not unique across a worklist.
    pub fn display_name(&self) -> String {
        match self.source_path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.source_path.to_string_lossy().into_owned(),
        }
    }

    /// `<destination_dir>/<display_name>.log`
    pub fn log_path(&self) -> PathBuf {
        self.destination_dir
            .join(format!("{}.log", self.display_name()))
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source_path.display(),
            self.destination_dir.display()
        )
    }
}
