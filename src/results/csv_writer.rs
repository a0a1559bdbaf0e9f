//! Append-only CSV writer for benchmark results.

use crate::errors::{ScoringError, ScoringResult};
use crate::harness::BenchmarkResult;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names of the result file, in row order.
pub const CSV_HEADER: [&str; 16] = [
    "test_name",
    "backend",
    "iterations",
    "total_time_sec",
    "mean_latency_ms",
    "stddev_latency_ms",
    "min_latency_ms",
    "p50_latency_ms",
    "p90_latency_ms",
    "max_latency_ms",
    "throughput_ips",
    "top1_accuracy",
    "top5_accuracy",
    "mean_squared_error",
    "complete_input_set",
    "timed_out",
];

/// One serialized result row. Field order must match `CSV_HEADER`.
#[derive(Serialize)]
struct CsvRow<'a> {
    test_name: &'a str,
    backend: &'static str,
    iterations: usize,
    total_time_sec: f64,
    mean_latency_ms: f64,
    stddev_latency_ms: f64,
    min_latency_ms: f64,
    p50_latency_ms: f64,
    p90_latency_ms: f64,
    max_latency_ms: f64,
    throughput_ips: f64,
    top1_accuracy: Option<f64>,
    top5_accuracy: Option<f64>,
    mean_squared_error: Option<f64>,
    complete_input_set: bool,
    timed_out: bool,
}

impl<'a> From<&'a BenchmarkResult> for CsvRow<'a> {
    fn from(result: &'a BenchmarkResult) -> Self {
        let ms = |seconds: f64| seconds * 1000.0;
        Self {
            test_name: &result.test_name,
            backend: result.backend.name(),
            iterations: result.iterations,
            total_time_sec: result.total_time_sec,
            mean_latency_ms: ms(result.latency.mean),
            stddev_latency_ms: ms(result.latency.std_deviation),
            min_latency_ms: ms(result.latency.min),
            p50_latency_ms: ms(result.latency.p50),
            p90_latency_ms: ms(result.latency.p90),
            max_latency_ms: ms(result.latency.max),
            throughput_ips: result.throughput_ips(),
            top1_accuracy: result.evaluation.top1_accuracy,
            top5_accuracy: result.evaluation.top5_accuracy,
            mean_squared_error: result.evaluation.mean_squared_error,
            complete_input_set: result.complete_input_set,
            timed_out: result.timed_out,
        }
    }
}

/// Writes result rows to the end of a CSV file. Dropping the writer flushes it.
pub struct CsvWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvWriter {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> ScoringResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ScoringError::io(&path, e))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        Ok(Self { path, writer })
    }

    pub fn write_header(&mut self) -> ScoringResult<()> {
        self.writer
            .write_record(CSV_HEADER)
            .map_err(|source| self.csv_error(source))
    }

    pub fn write(&mut self, result: &BenchmarkResult) -> ScoringResult<()> {
        self.writer
            .serialize(CsvRow::from(result))
            .map_err(|source| self.csv_error(source))
    }

    pub fn flush(&mut self) -> ScoringResult<()> {
        self.writer
            .flush()
            .map_err(|e| ScoringError::io(&self.path, e))
    }

    fn csv_error(&self, source: csv::Error) -> ScoringError {
        ScoringError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }
}
