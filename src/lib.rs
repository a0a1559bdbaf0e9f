//! Device scoring suite for neural network inference.
//!
//! This library runs a fixed catalog of benchmark models on a generic CPU
//! backend and on an accelerated backend, measures per-inference latency and
//! output quality, and collects one CSV row per (model, backend) case. The
//! result file is reset before the first case and copied to an export
//! location after the last one.

pub mod activation;
pub mod backend;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod harness;
pub mod models;
pub mod network;
pub mod results;
pub mod suite;

pub use activation::Activation;
pub use backend::{Backend, Executor};
pub use config::{ConfigLoader, ScoringConfig};
pub use harness::{BenchmarkHarness, BenchmarkResult, TestAction};
pub use models::{ModelEntry, ModelRegistry};
pub use network::ReferenceNetwork;
pub use results::{CsvWriter, ResultStore};
pub use suite::{MODEL_NAMES, ScoringSuite, SuiteFilter, SuiteReport, TestSize};
