//! Reference network executed by the benchmark backends.
//!
//! A network is a sequence of dense layers laid out over one unified
//! computation buffer: the input region comes first, followed by the output
//! region of each layer in order. A single buffer of `required_memory()`
//! values is therefore enough to run one inference, and the result lives in
//! `[output_index_start, required_memory)`.

pub mod dense_layer;
pub mod quantization;

pub use dense_layer::{DenseLayer, LayerWeights};
pub use quantization::QuantizedMatrix;

use crate::activation::Activation;
use crate::errors::{ExecutionError, ExecutionResult, ModelError, ModelResult};
use crate::models::{ModelEntry, Precision};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum unified computation buffer size.
pub const MAX_COMPUTATION_BUFFER_SIZE: usize = 1_000_000;

/// Maximum number of weights across all layers.
pub const MAX_WEIGHT_SIZE: usize = 10_000_000;

/// Float parameters of one dense layer before layout.
#[derive(Debug, Clone)]
pub struct LayerParameters {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub activation: Option<Activation>,
}

pub struct ReferenceNetwork {
    name: String,
    precision: Precision,
    layers: Vec<DenseLayer>,
    feature_size: usize,
    output_index_start: usize,
    output_index_end: usize,
}

impl ReferenceNetwork {
    /// Builds the network of `entry` with deterministic weights.
    ///
    /// Weights depend only on the entry seed and shape, so the float and
    /// quantized builds of one entry share the same underlying parameters.
    pub fn build(entry: &ModelEntry, precision: Precision) -> ModelResult<Self> {
        let feature_size = entry.feature_size()?;
        let shapes = entry.layer_shapes()?;
        let mut rng = StdRng::seed_from_u64(entry.seed);

        let mut layers = Vec::with_capacity(shapes.len());
        let mut fan_in = feature_size;
        for shape in shapes {
            // Glorot uniform initialization keeps activations in range across layers.
            let limit = (6.0 / (fan_in + shape.units) as f32).sqrt();
            let weights = (0..shape.units)
                .map(|_| (0..fan_in).map(|_| rng.gen_range(-limit..limit)).collect())
                .collect();
            let bias = (0..shape.units).map(|_| rng.gen_range(-0.01..0.01)).collect();
            layers.push(LayerParameters {
                weights,
                bias,
                activation: shape.activation,
            });
            fan_in = shape.units;
        }

        let name = match precision {
            Precision::Float32 => entry.reference_name(),
            Precision::Quant8 => entry.name.clone(),
        };
        Self::from_parameters(&name, feature_size, layers, precision)
    }

    /// Lays out explicit layer parameters over a unified buffer.
    pub fn from_parameters(
        name: &str,
        feature_size: usize,
        layers: Vec<LayerParameters>,
        precision: Precision,
    ) -> ModelResult<Self> {
        let invalid = |message: String| ModelError::InvalidModelSpec {
            name: name.to_string(),
            message,
        };

        if feature_size == 0 {
            return Err(invalid("Feature size must be greater than 0".to_string()));
        }
        if layers.is_empty() {
            return Err(invalid("No layers provided".to_string()));
        }

        let mut dense_layers = Vec::with_capacity(layers.len());
        let mut input_ptr = 0;
        let mut input_size = feature_size;
        let mut output_ptr = feature_size;
        let mut weight_count = 0;

        for (index, layer) in layers.into_iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(invalid(format!("Layer {} has no output units", index)));
            }
            if layer.weights.len() != layer.bias.len() {
                return Err(invalid(format!(
                    "Layer {} has {} weight rows but {} bias values",
                    index,
                    layer.weights.len(),
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().position(|r| r.len() != input_size) {
                return Err(invalid(format!(
                    "Layer {} weight row {} has {} values, expected {}",
                    index,
                    row,
                    layer.weights[row].len(),
                    input_size
                )));
            }

            let units = layer.bias.len();
            weight_count += units * input_size;
            let weights = match precision {
                Precision::Float32 => LayerWeights::Float(layer.weights),
                Precision::Quant8 => {
                    LayerWeights::Quantized(QuantizedMatrix::from_rows(&layer.weights))
                }
            };
            dense_layers.push(DenseLayer::new(
                weights,
                layer.bias,
                input_ptr,
                input_size,
                output_ptr,
                layer.activation,
            ));

            input_ptr = output_ptr;
            input_size = units;
            output_ptr += units;
        }

        if weight_count > MAX_WEIGHT_SIZE {
            return Err(invalid(format!(
                "Weight size {} exceeds limit {}",
                weight_count, MAX_WEIGHT_SIZE
            )));
        }
        if output_ptr > MAX_COMPUTATION_BUFFER_SIZE {
            return Err(invalid(format!(
                "Computation buffer size {} exceeds limit {}",
                output_ptr, MAX_COMPUTATION_BUFFER_SIZE
            )));
        }

        debug!(
            "Built {} network '{}': {} layers, {} weights, {} buffer values",
            precision,
            name,
            dense_layers.len(),
            weight_count,
            output_ptr
        );

        Ok(Self {
            name: name.to_string(),
            precision,
            layers: dense_layers,
            feature_size,
            output_index_start: input_ptr,
            output_index_end: output_ptr,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn output_size(&self) -> usize {
        self.output_index_end - self.output_index_start
    }

    pub fn output_index_start(&self) -> usize {
        self.output_index_start
    }

    /// Number of f32 values one inference needs.
    pub fn required_memory(&self) -> usize {
        self.output_index_end
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Runs every layer over a buffer whose first `feature_size` values hold the input.
    pub fn predict_with_buffer(&self, unified_computation_buffer: &mut [f32]) -> ExecutionResult<()> {
        if unified_computation_buffer.len() < self.output_index_end {
            return Err(ExecutionError::BufferTooSmall {
                required: self.output_index_end,
                actual: unified_computation_buffer.len(),
            });
        }
        for layer in &self.layers {
            layer.apply(unified_computation_buffer);
        }
        Ok(())
    }

    /// Output region of a buffer after `predict_with_buffer`.
    pub fn output<'a>(&self, unified_computation_buffer: &'a [f32]) -> &'a [f32] {
        &unified_computation_buffer[self.output_index_start..self.output_index_end]
    }

    /// Runs a single sample with a freshly allocated buffer.
    pub fn predict(&self, input: &[f32]) -> ExecutionResult<Vec<f32>> {
        if input.len() != self.feature_size {
            return Err(ExecutionError::InputSizeMismatch {
                expected: self.feature_size,
                actual: input.len(),
            });
        }
        let mut buffer = vec![0.0f32; self.required_memory()];
        buffer[..self.feature_size].copy_from_slice(input);
        self.predict_with_buffer(&mut buffer)?;
        Ok(self.output(&buffer).to_vec())
    }
}
