use super::{Backend, Executor, check_batch, run_samples};
use crate::errors::{ExecutionError, ExecutionResult};
use crate::network::ReferenceNetwork;
use log::debug;
use std::sync::Arc;
use std::thread;

/// Samples handed to each worker per batch.
const SAMPLES_PER_WORKER: usize = 4;

/// Accelerated path: each batch is split into contiguous chunks, one per
/// scoped worker thread, and every worker owns a computation buffer.
pub struct AcceleratedExecutor {
    network: Arc<ReferenceNetwork>,
    buffers: Vec<Vec<f32>>,
}

impl AcceleratedExecutor {
    pub fn new(network: Arc<ReferenceNetwork>, threads: usize) -> ExecutionResult<Self> {
        if threads == 0 {
            return Err(ExecutionError::InvalidThreadCount { count: 0 });
        }
        let required_memory = network.required_memory();
        debug!(
            "Accelerated executor for '{}' with {} workers",
            network.name(),
            threads
        );
        Ok(Self {
            buffers: vec![vec![0.0f32; required_memory]; threads],
            network,
        })
    }

    pub fn threads(&self) -> usize {
        self.buffers.len()
    }
}

impl Executor for AcceleratedExecutor {
    fn backend(&self) -> Backend {
        Backend::Accelerated
    }

    fn feature_size(&self) -> usize {
        self.network.feature_size()
    }

    fn output_size(&self) -> usize {
        self.network.output_size()
    }

    fn preferred_batch_size(&self) -> usize {
        self.threads() * SAMPLES_PER_WORKER
    }

    fn run_batch(&mut self, inputs: &[f32], outputs: &mut [f32]) -> ExecutionResult<()> {
        let num_samples = check_batch(&self.network, inputs, outputs)?;
        if num_samples == 0 {
            return Ok(());
        }

        let network: &ReferenceNetwork = &self.network;
        let buffers = &mut self.buffers;
        let workers = buffers.len().min(num_samples);
        let samples_per_worker = num_samples.div_ceil(workers);

        if workers == 1 {
            return run_samples(network, inputs, outputs, &mut buffers[0]);
        }

        thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .chunks(samples_per_worker * network.feature_size())
                .zip(outputs.chunks_mut(samples_per_worker * network.output_size()))
                .zip(buffers.iter_mut())
                .map(|((input_chunk, output_chunk), buffer)| {
                    scope.spawn(move || run_samples(network, input_chunk, output_chunk, buffer))
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(result) => result?,
                    Err(_) => return Err(ExecutionError::WorkerPanicked),
                }
            }
            Ok(())
        })
    }
}
