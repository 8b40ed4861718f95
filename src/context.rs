//! Output locations for one pipeline run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sub-directory holding per-club and merged tables.
pub const CSV_DIR: &str = "csv_files";

/// File identity of the combined table.
pub const MERGED_ID: &str = "merged";

/// Artifact list written at the end of a run.
pub const FILES_LIST: &str = "files_list.txt";

/// Where a run writes its artifacts. Passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    output_dir: PathBuf,
}

impl RunContext {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.output_dir.join(CSV_DIR)
    }

    /// Path of the table for `table_id` (a club identifier or [`MERGED_ID`]).
    pub fn table_path(&self, table_id: &str) -> PathBuf {
        self.csv_dir().join(table_file_name(table_id))
    }

    /// Create the output directories if missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        let csv_dir = self.csv_dir();
        if csv_dir.exists() && !csv_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", csv_dir.display()),
            ));
        }
        fs::create_dir_all(csv_dir)
    }

    /// Path relative to the output directory, for listings.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.output_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// `<table_id>_values.csv`
pub fn table_file_name(table_id: &str) -> String {
    format!("{}_values.csv", table_id)
}
