//! Benchmark result records.

use crate::backend::Backend;
use crate::harness::evaluation::EvaluationSummary;

/// Latency distribution of single inferences, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatencyStats {
    pub mean: f64,
    pub std_deviation: f64,
    pub min: f64,
    pub p50: f64,
    pub p90: f64,
    pub max: f64,
}

impl LatencyStats {
    /// Computes the distribution of `latencies`. An empty slice yields all zeros.
    pub fn from_latencies(latencies: &[f64]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let count = latencies.len() as f64;
        let mean = latencies.iter().sum::<f64>() / count;
        let variance = latencies.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / count;

        let mut sorted = latencies.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            mean,
            std_deviation: variance.sqrt(),
            min: sorted[0],
            p50: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], percent: f64) -> f64 {
    let rank = ((percent / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Outcome of running one model on one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub test_name: String,
    pub backend: Backend,
    /// Number of timed inferences.
    pub iterations: usize,
    /// Wall time of the timed phase, warm-up excluded.
    pub total_time_sec: f64,
    pub latency: LatencyStats,
    pub evaluation: EvaluationSummary,
    pub complete_input_set: bool,
    /// The complete input set was cut short by the run timeout.
    pub timed_out: bool,
}

impl BenchmarkResult {
    pub fn new(
        test_name: &str,
        backend: Backend,
        latencies: &[f64],
        total_time_sec: f64,
        evaluation: EvaluationSummary,
        complete_input_set: bool,
        timed_out: bool,
    ) -> Self {
        Self {
            test_name: test_name.to_string(),
            backend,
            iterations: latencies.len(),
            total_time_sec,
            latency: LatencyStats::from_latencies(latencies),
            evaluation,
            complete_input_set,
            timed_out,
        }
    }

    pub fn mean_latency_ms(&self) -> f64 {
        self.latency.mean * 1000.0
    }

    /// Inferences per second based on the summed inference latency.
    pub fn throughput_ips(&self) -> f64 {
        let busy = self.latency.mean * self.iterations as f64;
        if busy > 0.0 {
            self.iterations as f64 / busy
        } else {
            0.0
        }
    }

    /// Latency ratio against a baseline result, e.g. accelerated vs. CPU.
    pub fn speedup_over(&self, baseline: &BenchmarkResult) -> f64 {
        if self.latency.mean > 0.0 {
            baseline.latency.mean / self.latency.mean
        } else {
            0.0
        }
    }
}
