//! Execution backends.
//!
//! A backend turns a [`ReferenceNetwork`] into an [`Executor`] that runs
//! batches of samples. The CPU backend is the generic software path; the
//! accelerated backend spreads each batch across worker threads. Both run the
//! same per-sample computation, so their outputs are identical.

mod accelerated;
mod cpu;

pub use accelerated::AcceleratedExecutor;
pub use cpu::CpuExecutor;

use crate::errors::{ExecutionError, ExecutionResult};
use crate::network::ReferenceNetwork;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Execution path used to run a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Cpu,
    Accelerated,
}

impl Backend {
    /// Backends in the order the suite runs them.
    pub const ALL: [Backend; 2] = [Backend::Cpu, Backend::Accelerated];

    /// Name written to the result file.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Cpu => "tflite_cpu",
            Backend::Accelerated => "nnapi",
        }
    }

    pub fn uses_accelerator(self) -> bool {
        self == Backend::Accelerated
    }

    /// Builds the executor for this backend. `threads` is only used by the accelerated path.
    pub fn executor(
        self,
        network: Arc<ReferenceNetwork>,
        threads: usize,
    ) -> ExecutionResult<Box<dyn Executor>> {
        Ok(match self {
            Backend::Cpu => Box::new(CpuExecutor::new(network)),
            Backend::Accelerated => Box::new(AcceleratedExecutor::new(network, threads)?),
        })
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs batches of samples through a network.
///
/// `inputs` holds `n * feature_size()` values and `outputs` must hold exactly
/// `n * output_size()` values.
pub trait Executor: Send {
    fn backend(&self) -> Backend;

    fn feature_size(&self) -> usize;

    fn output_size(&self) -> usize;

    /// Number of samples the executor handles best in one call.
    fn preferred_batch_size(&self) -> usize;

    fn run_batch(&mut self, inputs: &[f32], outputs: &mut [f32]) -> ExecutionResult<()>;
}

/// Validates batch buffers and returns the number of samples.
pub(crate) fn check_batch(
    network: &ReferenceNetwork,
    inputs: &[f32],
    outputs: &[f32],
) -> ExecutionResult<usize> {
    let feature_size = network.feature_size();
    let output_size = network.output_size();

    if !inputs.len().is_multiple_of(feature_size) {
        let num_samples = inputs.len() / feature_size;
        return Err(ExecutionError::InputSizeMismatch {
            expected: (num_samples + 1) * feature_size,
            actual: inputs.len(),
        });
    }

    let num_samples = inputs.len() / feature_size;
    if outputs.len() != num_samples * output_size {
        return Err(ExecutionError::OutputSizeMismatch {
            expected: num_samples * output_size,
            actual: outputs.len(),
            num_samples,
        });
    }
    Ok(num_samples)
}

/// Runs every sample of `inputs` through `network` using one computation buffer.
pub(crate) fn run_samples(
    network: &ReferenceNetwork,
    inputs: &[f32],
    outputs: &mut [f32],
    buffer: &mut [f32],
) -> ExecutionResult<()> {
    let feature_size = network.feature_size();
    for (input, output) in inputs
        .chunks_exact(feature_size)
        .zip(outputs.chunks_exact_mut(network.output_size()))
    {
        buffer[..feature_size].copy_from_slice(input);
        network.predict_with_buffer(buffer)?;
        output.copy_from_slice(network.output(buffer));
    }
    Ok(())
}
