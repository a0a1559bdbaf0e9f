//! Benchmark harness.
//!
//! The harness holds the knobs shared by every benchmark case (which backend
//! to use, whether to iterate the complete input set) and drives a
//! [`TestAction`] through warm-up and the timed phase.

pub mod benchmark_result;
pub mod evaluation;
pub mod test_action;

pub use benchmark_result::{BenchmarkResult, LatencyStats};
pub use evaluation::{Evaluation, EvaluationSummary};
pub use test_action::TestAction;

use crate::backend::Backend;
use crate::config::ScoringConfig;
use crate::errors::ScoringResult;
use log::info;
use std::thread;

/// Warm-up duration for repeatable measurements.
pub const WARMUP_REPEATABLE_SECONDS: f64 = 2.0;

/// Upper bound on a complete input set run.
pub const COMPLETE_SET_TIMEOUT_SECONDS: f64 = 300.0;

/// Timed phase duration when the complete input set is not requested.
pub const RUNTIME_REPEATABLE_SECONDS: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub use_accelerator: bool,
    /// Run every dataset sample exactly once instead of cycling for `run_seconds`.
    pub complete_input_set: bool,
    pub accelerator_threads: Option<usize>,
    pub dataset_limit: Option<usize>,
    pub run_seconds: f64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            use_accelerator: false,
            complete_input_set: false,
            accelerator_threads: None,
            dataset_limit: None,
            run_seconds: RUNTIME_REPEATABLE_SECONDS,
        }
    }
}

impl HarnessSettings {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            accelerator_threads: config.accelerator_threads,
            dataset_limit: config.dataset_limit,
            run_seconds: config.run_seconds,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> Backend {
        if self.use_accelerator {
            Backend::Accelerated
        } else {
            Backend::Cpu
        }
    }

    /// Worker count of the accelerated backend, defaulting to the available parallelism.
    pub fn accelerator_threads(&self) -> usize {
        self.accelerator_threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Shared harness every scoring case runs through.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkHarness {
    settings: HarnessSettings,
}

impl BenchmarkHarness {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn set_use_accelerator(&mut self, use_accelerator: bool) {
        self.settings.use_accelerator = use_accelerator;
    }

    pub fn set_complete_input_set(&mut self, complete_input_set: bool) {
        self.settings.complete_input_set = complete_input_set;
    }

    pub fn backend(&self) -> Backend {
        self.settings.backend()
    }

    /// Runs `action` and stores its result in the action.
    pub fn run_test(&self, action: &mut TestAction, test_name: &str) -> ScoringResult<()> {
        info!("Starting benchmark '{}' on {}", test_name, self.backend());
        action.run(test_name, &self.settings)
    }
}
