//! Input datasets with golden outputs.
//!
//! Samples are generated deterministically from the model seed, so every
//! backend and every run of a model sees the same inputs. The golden output of
//! a sample is what the float reference network produces for it; quantized
//! models are scored against those outputs.

use crate::backend::run_samples;
use crate::errors::{ExecutionError, ExecutionResult};
use crate::models::ModelEntry;
use crate::network::ReferenceNetwork;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Mixed into the model seed so inputs do not reuse the weight stream.
const INPUT_STREAM_SALT: u64 = 0x5eed_da7a_0000_0001;

pub struct InputDataset {
    feature_size: usize,
    output_size: usize,
    inputs: Vec<f32>,
    golden: Vec<f32>,
}

impl InputDataset {
    /// Generates `entry.dataset_size` samples, capped by `limit`.
    pub fn generate(
        entry: &ModelEntry,
        reference: &ReferenceNetwork,
        limit: Option<usize>,
    ) -> ExecutionResult<Self> {
        let sample_count = limit.map_or(entry.dataset_size, |l| l.min(entry.dataset_size));
        if sample_count == 0 {
            return Err(ExecutionError::EmptyDataset {
                model: entry.name.clone(),
            });
        }

        let feature_size = reference.feature_size();
        let output_size = reference.output_size();
        let mut rng = StdRng::seed_from_u64(entry.seed ^ INPUT_STREAM_SALT);
        let inputs: Vec<f32> = (0..sample_count * feature_size)
            .map(|_| rng.gen_range(-1.0f32..=1.0))
            .collect();

        let mut golden = vec![0.0f32; sample_count * output_size];
        let mut buffer = vec![0.0f32; reference.required_memory()];
        run_samples(reference, &inputs, &mut golden, &mut buffer)?;

        debug!(
            "Generated {} samples for '{}' against reference '{}'",
            sample_count,
            entry.name,
            reference.name()
        );

        Ok(Self {
            feature_size,
            output_size,
            inputs,
            golden,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.inputs.len() / self.feature_size
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn input(&self, index: usize) -> &[f32] {
        &self.inputs[index * self.feature_size..(index + 1) * self.feature_size]
    }

    pub fn golden(&self, index: usize) -> &[f32] {
        &self.golden[index * self.output_size..(index + 1) * self.output_size]
    }

    /// Contiguous inputs of the samples in `range`.
    pub fn inputs_range(&self, range: Range<usize>) -> &[f32] {
        &self.inputs[range.start * self.feature_size..range.end * self.feature_size]
    }

    pub fn inputs_flat(&self) -> &[f32] {
        &self.inputs
    }
}
