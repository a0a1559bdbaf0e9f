//! Device scoring suite.
//!
//! Runs every scored model on the CPU backend and on the accelerated backend,
//! appending one CSV row per case. The result file is reset once before the
//! first case and exported once after the last one. Cases run strictly one
//! after another.

use crate::backend::Backend;
use crate::config::ScoringConfig;
use crate::errors::{ModelResult, ScoringError, ScoringResult};
use crate::harness::{BenchmarkHarness, BenchmarkResult, HarnessSettings, TestAction};
use crate::models::{ModelEntry, ModelRegistry};
use crate::results::{ProbeFilePermission, ResultStore, WritePermission};
use log::{error, info, warn};
use std::io;

/// Models scored by the suite, in execution order.
pub const MODEL_NAMES: [&str; 15] = [
    "tts_float",
    "asr_float",
    "mobilenet_v1_1.0_224_quant_topk_aosp",
    "mobilenet_v1_1.0_224_topk_aosp",
    "mobilenet_v1_0.75_192_quant_topk_aosp",
    "mobilenet_v1_0.75_192_topk_aosp",
    "mobilenet_v1_0.5_160_quant_topk_aosp",
    "mobilenet_v1_0.5_160_topk_aosp",
    "mobilenet_v1_0.25_128_quant_topk_aosp",
    "mobilenet_v1_0.25_128_topk_aosp",
    "mobilenet_v2_0.35_128_topk_aosp",
    "mobilenet_v2_0.5_160_topk_aosp",
    "mobilenet_v2_0.75_192_topk_aosp",
    "mobilenet_v2_1.0_224_topk_aosp",
    "mobilenet_v2_1.0_224_quant_topk_aosp",
];

/// Size class of a test case, used to select cases from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSize {
    Small,
    Medium,
    Large,
}

impl TestSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "small" => Some(TestSize::Small),
            "medium" => Some(TestSize::Medium),
            "large" => Some(TestSize::Large),
            _ => None,
        }
    }
}

/// Size class of every scoring case.
pub const SCORING_TEST_SIZE: TestSize = TestSize::Large;

/// Selects which cases of the suite run.
#[derive(Debug, Clone)]
pub struct SuiteFilter {
    pub size: TestSize,
    /// Only models whose name contains this substring.
    pub name: Option<String>,
}

impl Default for SuiteFilter {
    fn default() -> Self {
        Self {
            size: SCORING_TEST_SIZE,
            name: None,
        }
    }
}

impl SuiteFilter {
    pub fn matches(&self, model: &ModelEntry) -> bool {
        self.size == SCORING_TEST_SIZE
            && self
                .name
                .as_deref()
                .is_none_or(|fragment| model.name.contains(fragment))
    }
}

/// Outcome of one (model, backend) case.
#[derive(Debug)]
pub struct CaseOutcome {
    pub model: String,
    pub backend: Backend,
    pub result: ScoringResult<BenchmarkResult>,
}

impl CaseOutcome {
    /// Case identifier in `model[backend]` form.
    pub fn case_name(&self) -> String {
        format!("{}[{}]", self.model, self.backend)
    }

    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Accelerated-over-CPU speedup of every model that passed on both backends.
    pub fn speedups(&self) -> Vec<(&str, f64)> {
        let result_on = |model: &str, backend: Backend| {
            self.cases
                .iter()
                .find(|c| c.model == model && c.backend == backend)
                .and_then(|c| c.result.as_ref().ok())
        };
        self.cases
            .iter()
            .filter(|c| c.backend == Backend::Accelerated)
            .filter_map(|c| {
                let accelerated = c.result.as_ref().ok()?;
                let cpu = result_on(&c.model, Backend::Cpu)?;
                Some((c.model.as_str(), accelerated.speedup_over(cpu)))
            })
            .collect()
    }
}

/// Resolves every name against the registry. Any unknown name fails the whole list.
pub fn models_list<S: AsRef<str>>(
    registry: &ModelRegistry,
    names: &[S],
) -> ModelResult<Vec<ModelEntry>> {
    names
        .iter()
        .map(|name| registry.model_by_name(name.as_ref()).cloned())
        .collect()
}

pub struct ScoringSuite {
    config: ScoringConfig,
    registry: ModelRegistry,
    store: ResultStore,
    permission: Box<dyn WritePermission>,
}

impl ScoringSuite {
    pub fn new(config: ScoringConfig, registry: ModelRegistry) -> ScoringResult<Self> {
        config.validate()?;
        let store = ResultStore::from_config(&config);
        let permission = Box::new(ProbeFilePermission::new(config.export_dir.clone()));
        Ok(Self {
            config,
            registry,
            store,
            permission,
        })
    }

    /// Replaces the export storage permission check.
    pub fn with_permission(mut self, permission: impl WritePermission + 'static) -> Self {
        self.permission = Box::new(permission);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn model_names(&self) -> Vec<String> {
        match &self.config.models {
            Some(models) => models.clone(),
            None => MODEL_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn models(&self) -> ModelResult<Vec<ModelEntry>> {
        models_list(&self.registry, &self.model_names())
    }

    /// Suite setup: clears the local result file and writes the header.
    pub fn before_all(&self) -> ScoringResult<()> {
        self.store.reset()
    }

    /// Runs one model on one backend and appends its row to the local file.
    pub fn run_case(&self, model: &ModelEntry, backend: Backend) -> ScoringResult<BenchmarkResult> {
        if !self.permission.check() {
            return Err(ScoringError::io(
                &self.config.export_dir,
                io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "No permission to store results in external storage",
                ),
            ));
        }

        let mut harness = BenchmarkHarness::new(HarnessSettings::from_config(&self.config));
        harness.set_use_accelerator(backend.uses_accelerator());
        harness.set_complete_input_set(true);

        let mut action = TestAction::new(
            model.clone(),
            self.config.warmup_seconds,
            self.config.complete_set_timeout_seconds,
        );
        harness.run_test(&mut action, model.test_name())?;

        let result = action
            .into_benchmark()
            .ok_or_else(|| ScoringError::MissingResult {
                test_name: model.test_name().to_string(),
            })?;
        self.store.append(&result)?;
        Ok(result)
    }

    /// Suite teardown: copies the local result file to the export location.
    pub fn after_all(&self) -> ScoringResult<()> {
        self.store.export().map(|_| ())
    }

    /// Runs setup, every selected case, and teardown.
    ///
    /// A failing case is recorded in the report and the suite moves on;
    /// setup and teardown failures abort the run.
    pub fn run(&self, filter: &SuiteFilter) -> ScoringResult<SuiteReport> {
        let models = self.models()?;
        self.before_all()?;

        if filter.size != SCORING_TEST_SIZE {
            warn!(
                "Size filter {:?} excludes every scoring case ({:?})",
                filter.size, SCORING_TEST_SIZE
            );
        }

        let mut report = SuiteReport::default();
        for model in models.iter().filter(|m| filter.matches(m)) {
            for backend in Backend::ALL {
                let outcome = CaseOutcome {
                    model: model.name.clone(),
                    backend,
                    result: self.run_case(model, backend),
                };
                match &outcome.result {
                    Ok(_) => info!("PASSED {}", outcome.case_name()),
                    Err(e) => error!("FAILED {}: {}", outcome.case_name(), e),
                }
                report.cases.push(outcome);
            }
        }

        self.after_all()?;
        info!(
            "Scoring finished: {} passed, {} failed",
            report.passed(),
            report.failed()
        );
        Ok(report)
    }
}
