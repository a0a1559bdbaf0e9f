use super::{Backend, Executor, check_batch, run_samples};
use crate::errors::ExecutionResult;
use crate::network::ReferenceNetwork;
use std::sync::Arc;

/// Generic software path: one sample at a time on the calling thread.
pub struct CpuExecutor {
    network: Arc<ReferenceNetwork>,
    buffer: Vec<f32>,
}

impl CpuExecutor {
    pub fn new(network: Arc<ReferenceNetwork>) -> Self {
        let buffer = vec![0.0f32; network.required_memory()];
        Self { network, buffer }
    }
}

impl Executor for CpuExecutor {
    fn backend(&self) -> Backend {
        Backend::Cpu
    }

    fn feature_size(&self) -> usize {
        self.network.feature_size()
    }

    fn output_size(&self) -> usize {
        self.network.output_size()
    }

    fn preferred_batch_size(&self) -> usize {
        1
    }

    fn run_batch(&mut self, inputs: &[f32], outputs: &mut [f32]) -> ExecutionResult<()> {
        check_batch(&self.network, inputs, outputs)?;
        run_samples(&self.network, inputs, outputs, &mut self.buffer)
    }
}
