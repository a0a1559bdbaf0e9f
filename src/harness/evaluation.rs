//! Output scoring against golden outputs.

use crate::models::Evaluator;

/// Accumulates the score of every timed inference.
#[derive(Debug, Clone)]
pub struct Evaluation {
    evaluator: Evaluator,
    samples: usize,
    top1_hits: usize,
    top5_hits: usize,
    squared_error_sum: f64,
    value_count: usize,
}

/// Final scores. Metrics that do not apply to the evaluator are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvaluationSummary {
    pub top1_accuracy: Option<f64>,
    pub top5_accuracy: Option<f64>,
    pub mean_squared_error: Option<f64>,
}

impl Evaluation {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            samples: 0,
            top1_hits: 0,
            top5_hits: 0,
            squared_error_sum: 0.0,
            value_count: 0,
        }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn record(&mut self, output: &[f32], golden: &[f32]) {
        self.samples += 1;
        match self.evaluator {
            Evaluator::TopK => {
                let Some(label) = argmax(golden) else {
                    return;
                };
                // A non-finite score at the label never counts as a hit.
                let Some(&score) = output.get(label).filter(|v| v.is_finite()) else {
                    return;
                };
                let rank = output.iter().filter(|&&v| v > score).count();
                if rank < 1 {
                    self.top1_hits += 1;
                }
                if rank < 5 {
                    self.top5_hits += 1;
                }
            }
            Evaluator::MeanSquaredError => {
                for (&o, &g) in output.iter().zip(golden.iter()) {
                    let diff = (o - g) as f64;
                    self.squared_error_sum += diff * diff;
                }
                self.value_count += output.len().min(golden.len());
            }
        }
    }

    pub fn summary(&self) -> EvaluationSummary {
        match self.evaluator {
            Evaluator::TopK if self.samples > 0 => EvaluationSummary {
                top1_accuracy: Some(self.top1_hits as f64 / self.samples as f64),
                top5_accuracy: Some(self.top5_hits as f64 / self.samples as f64),
                mean_squared_error: None,
            },
            Evaluator::MeanSquaredError if self.value_count > 0 => EvaluationSummary {
                mean_squared_error: Some(self.squared_error_sum / self.value_count as f64),
                ..EvaluationSummary::default()
            },
            _ => EvaluationSummary::default(),
        }
    }
}

/// Index of the largest value; ties resolve to the first index.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (index, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_counts_rank_of_golden_label() {
        let mut evaluation = Evaluation::new(Evaluator::TopK);
        let golden = [0.0, 0.9, 0.1, 0.0, 0.0, 0.0, 0.0];
        // label 1 ranked first
        evaluation.record(&[0.1, 0.8, 0.1, 0.0, 0.0, 0.0, 0.0], &golden);
        // label 1 ranked third
        evaluation.record(&[0.5, 0.2, 0.3, 0.0, 0.0, 0.0, 0.0], &golden);
        // label 1 ranked seventh
        evaluation.record(&[0.2, 0.0, 0.2, 0.2, 0.2, 0.1, 0.1], &golden);

        let summary = evaluation.summary();
        assert_eq!(evaluation.samples(), 3);
        assert_eq!(summary.top1_accuracy, Some(1.0 / 3.0));
        assert_eq!(summary.top5_accuracy, Some(2.0 / 3.0));
        assert_eq!(summary.mean_squared_error, None);
    }

    #[test]
    fn test_non_finite_label_score_is_a_miss() {
        let mut evaluation = Evaluation::new(Evaluator::TopK);
        let golden = [0.0, 1.0, 0.0];
        evaluation.record(&[0.2, f32::NAN, 0.1], &golden);
        evaluation.record(&[f32::NAN, f32::NAN, f32::NAN], &golden);
        evaluation.record(&[0.0, f32::INFINITY, 0.0], &golden);
        evaluation.record(&[0.1, 0.7, 0.2], &golden);

        let summary = evaluation.summary();
        assert_eq!(evaluation.samples(), 4);
        assert_eq!(summary.top1_accuracy, Some(0.25));
        assert_eq!(summary.top5_accuracy, Some(0.25));
    }

    #[test]
    fn test_mean_squared_error() {
        let mut evaluation = Evaluation::new(Evaluator::MeanSquaredError);
        evaluation.record(&[1.0, 2.0], &[1.0, 4.0]);
        let summary = evaluation.summary();
        assert_eq!(summary.mean_squared_error, Some(2.0));
        assert_eq!(summary.top1_accuracy, None);
    }

    #[test]
    fn test_no_samples_yields_empty_summary() {
        let evaluation = Evaluation::new(Evaluator::TopK);
        assert_eq!(evaluation.summary(), EvaluationSummary::default());
    }

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
