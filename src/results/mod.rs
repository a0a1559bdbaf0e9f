//! Result file lifecycle.
//!
//! Results are appended to a local CSV file while the suite runs, then copied
//! whole to the export location. The export copy is always replaced, never
//! appended to.

pub mod csv_writer;
pub mod storage;

pub use csv_writer::{CSV_HEADER, CsvWriter};
pub use storage::{ProbeFilePermission, WritePermission, check_writable};

use crate::config::ScoringConfig;
use crate::errors::{ScoringError, ScoringResult};
use crate::harness::BenchmarkResult;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Local result file and its export destination.
#[derive(Debug, Clone)]
pub struct ResultStore {
    local_path: PathBuf,
    export_path: PathBuf,
}

impl ResultStore {
    pub fn new(local_path: impl Into<PathBuf>, export_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            export_path: export_path.into(),
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.local_results_path(), config.export_path())
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Replaces the local file with a fresh one holding only the header row.
    pub fn reset(&self) -> ScoringResult<()> {
        if let Some(parent) = self.local_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ScoringError::io(parent, e))?;
        }
        remove_if_exists(&self.local_path)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.local_path)
            .map_err(|e| ScoringError::io(&self.local_path, e))?;

        let mut writer = CsvWriter::open(&self.local_path)?;
        writer.write_header()?;
        writer.flush()?;
        info!("Reset result file '{}'", self.local_path.display());
        Ok(())
    }

    /// Appends one result row. The writer lives only for this call.
    pub fn append(&self, result: &BenchmarkResult) -> ScoringResult<()> {
        let mut writer = CsvWriter::open(&self.local_path)?;
        writer.write(result)?;
        writer.flush()?;
        debug!(
            "Appended '{}' on {} to '{}'",
            result.test_name,
            result.backend,
            self.local_path.display()
        );
        Ok(())
    }

    /// Copies the local file over the export path, deleting any stale copy first.
    pub fn export(&self) -> ScoringResult<u64> {
        if let Some(parent) = self.export_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ScoringError::io(parent, e))?;
        }
        remove_if_exists(&self.export_path)?;
        let bytes = fs::copy(&self.local_path, &self.export_path)
            .map_err(|e| ScoringError::io(&self.export_path, e))?;
        info!(
            "Copied {} bytes of results to '{}'",
            bytes,
            self.export_path.display()
        );
        Ok(bytes)
    }

    /// Number of data rows in the local file, header excluded.
    pub fn row_count(&self) -> ScoringResult<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.local_path)
            .map_err(|source| ScoringError::Csv {
                path: self.local_path.display().to_string(),
                source,
            })?;
        let mut rows = 0;
        for record in reader.records() {
            record.map_err(|source| ScoringError::Csv {
                path: self.local_path.display().to_string(),
                source,
            })?;
            rows += 1;
        }
        Ok(rows)
    }
}

fn remove_if_exists(path: &Path) -> ScoringResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ScoringError::io(path, e)),
    }
}
