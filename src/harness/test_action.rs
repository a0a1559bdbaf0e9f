//! A single benchmark run of one model.

use super::HarnessSettings;
use super::benchmark_result::BenchmarkResult;
use super::evaluation::Evaluation;
use crate::backend::Executor;
use crate::dataset::InputDataset;
use crate::errors::ScoringResult;
use crate::models::{ModelEntry, Precision};
use crate::network::ReferenceNetwork;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs a model through warm-up and a timed phase, then keeps the result.
pub struct TestAction {
    model: ModelEntry,
    warmup_seconds: f64,
    max_run_seconds: f64,
    benchmark: Option<BenchmarkResult>,
}

impl TestAction {
    pub fn new(model: ModelEntry, warmup_seconds: f64, max_run_seconds: f64) -> Self {
        Self {
            model,
            warmup_seconds,
            max_run_seconds,
            benchmark: None,
        }
    }

    pub fn model(&self) -> &ModelEntry {
        &self.model
    }

    /// Result of the last run, `None` until the action ran.
    pub fn benchmark(&self) -> Option<&BenchmarkResult> {
        self.benchmark.as_ref()
    }

    pub fn into_benchmark(self) -> Option<BenchmarkResult> {
        self.benchmark
    }

    pub(crate) fn run(&mut self, test_name: &str, settings: &HarnessSettings) -> ScoringResult<()> {
        let backend = settings.backend();

        let network = Arc::new(ReferenceNetwork::build(&self.model, self.model.precision)?);
        let reference = match self.model.precision {
            Precision::Float32 => Arc::clone(&network),
            Precision::Quant8 => Arc::new(ReferenceNetwork::build(&self.model, Precision::Float32)?),
        };
        let dataset = InputDataset::generate(&self.model, &reference, settings.dataset_limit)?;
        let mut executor = backend.executor(network, settings.accelerator_threads())?;

        info!(
            "Running '{}' on {} ({} samples, batch {}, complete set: {})",
            test_name,
            backend,
            dataset.sample_count(),
            executor.preferred_batch_size(),
            settings.complete_input_set
        );

        let mut runner = BatchRunner::new(executor.as_mut(), &dataset);
        runner.warm_up(Duration::from_secs_f64(self.warmup_seconds.max(0.0)))?;

        let mut evaluation = Evaluation::new(self.model.evaluator());
        let mut latencies = Vec::new();
        let mut timed_out = false;
        let run_start = Instant::now();

        if settings.complete_input_set {
            let limit = Duration::from_secs_f64(self.max_run_seconds.max(0.0));
            let mut start = 0;
            while start < dataset.sample_count() {
                if !latencies.is_empty() && run_start.elapsed() >= limit {
                    timed_out = true;
                    break;
                }
                start = runner.timed_batch(start, &mut latencies, &mut evaluation)?;
            }
        } else {
            let limit = Duration::from_secs_f64(settings.run_seconds.max(0.0));
            let mut start = 0;
            loop {
                start = runner.timed_batch(start, &mut latencies, &mut evaluation)?
                    % dataset.sample_count();
                if run_start.elapsed() >= limit {
                    break;
                }
            }
        }

        let total_time = run_start.elapsed().as_secs_f64();
        if timed_out {
            warn!(
                "'{}' on {} timed out after {} of {} samples",
                test_name,
                backend,
                latencies.len(),
                dataset.sample_count()
            );
        }

        let result = BenchmarkResult::new(
            test_name,
            backend,
            &latencies,
            total_time,
            evaluation.summary(),
            settings.complete_input_set,
            timed_out,
        );
        info!(
            "'{}' on {}: {} inferences, mean {:.3} ms, {:.1} inferences/s",
            test_name,
            backend,
            result.iterations,
            result.mean_latency_ms(),
            result.throughput_ips()
        );
        self.benchmark = Some(result);
        Ok(())
    }
}

/// Feeds dataset batches to an executor with a reusable output buffer.
struct BatchRunner<'a> {
    executor: &'a mut dyn Executor,
    dataset: &'a InputDataset,
    batch_size: usize,
    outputs: Vec<f32>,
}

impl<'a> BatchRunner<'a> {
    fn new(executor: &'a mut dyn Executor, dataset: &'a InputDataset) -> Self {
        let batch_size = executor.preferred_batch_size().max(1);
        let outputs = vec![0.0f32; batch_size * dataset.output_size()];
        Self {
            executor,
            dataset,
            batch_size,
            outputs,
        }
    }

    /// Runs the batch starting at `start` and returns the index after it.
    fn run_batch(&mut self, start: usize) -> ScoringResult<usize> {
        let end = (start + self.batch_size).min(self.dataset.sample_count());
        let len = (end - start) * self.dataset.output_size();
        self.executor
            .run_batch(self.dataset.inputs_range(start..end), &mut self.outputs[..len])?;
        Ok(end)
    }

    /// Cycles through the dataset without timing until `duration` has elapsed.
    fn warm_up(&mut self, duration: Duration) -> ScoringResult<()> {
        if duration.is_zero() {
            return Ok(());
        }
        let started = Instant::now();
        let mut start = 0;
        let mut batches = 0usize;
        while started.elapsed() < duration {
            start = self.run_batch(start)? % self.dataset.sample_count();
            batches += 1;
        }
        debug!("Warm-up ran {} batches", batches);
        Ok(())
    }

    /// Times one batch, records a per-inference latency for each sample and scores it.
    fn timed_batch(
        &mut self,
        start: usize,
        latencies: &mut Vec<f64>,
        evaluation: &mut Evaluation,
    ) -> ScoringResult<usize> {
        let batch_start = Instant::now();
        let end = self.run_batch(start)?;
        let per_inference = batch_start.elapsed().as_secs_f64() / (end - start) as f64;

        let output_size = self.dataset.output_size();
        for (offset, index) in (start..end).enumerate() {
            latencies.push(per_inference);
            let output = &self.outputs[offset * output_size..(offset + 1) * output_size];
            evaluation.record(output, self.dataset.golden(index));
        }
        Ok(end)
    }
}
