//! Dense layer operating on the unified computation buffer.
//!
//! Equivalent to the Dense layer of common deep learning frameworks:
//! `output = activation(W * input + bias)`.

use crate::activation::Activation;
use crate::network::quantization::QuantizedMatrix;

/// Weights of a dense layer, stored as float rows or quantized rows.
#[derive(Debug, Clone)]
pub enum LayerWeights {
    Float(Vec<Vec<f32>>),
    Quantized(QuantizedMatrix),
}

impl LayerWeights {
    pub fn rows(&self) -> usize {
        match self {
            LayerWeights::Float(rows) => rows.len(),
            LayerWeights::Quantized(matrix) => matrix.rows(),
        }
    }
}

/// Dense layer reading `input_size` values at `input_ptr` and writing
/// `data_size` values at `output_ptr`. The input region always lies before
/// the output region in the buffer.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: LayerWeights,
    bias: Vec<f32>,
    input_ptr: usize,
    input_size: usize,
    output_ptr: usize,
    data_size: usize,
    activation: Option<Activation>,
}

impl DenseLayer {
    pub fn new(
        weights: LayerWeights,
        bias: Vec<f32>,
        input_ptr: usize,
        input_size: usize,
        output_ptr: usize,
        activation: Option<Activation>,
    ) -> Self {
        let data_size = bias.len();
        Self {
            weights,
            bias,
            input_ptr,
            input_size,
            output_ptr,
            data_size,
            activation,
        }
    }

    pub fn output_ptr(&self) -> usize {
        self.output_ptr
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn is_quantized(&self) -> bool {
        matches!(self.weights, LayerWeights::Quantized(_))
    }

    /// Runs the layer in place. The caller guarantees the buffer covers the output region.
    #[inline(always)]
    pub fn apply(&self, unified_computation_buffer: &mut [f32]) {
        let (head, tail) = unified_computation_buffer.split_at_mut(self.output_ptr);
        let input = &head[self.input_ptr..self.input_ptr + self.input_size];
        let output = &mut tail[..self.data_size];

        match &self.weights {
            LayerWeights::Float(rows) => {
                for ((out, weights_row), &bias_value) in
                    output.iter_mut().zip(rows.iter()).zip(self.bias.iter())
                {
                    let mut sum = bias_value;
                    for (&weight, &x) in weights_row.iter().zip(input.iter()) {
                        sum += weight * x;
                    }
                    *out = sum;
                }
            }
            LayerWeights::Quantized(matrix) => {
                for (row_index, (out, &bias_value)) in
                    output.iter_mut().zip(self.bias.iter()).enumerate()
                {
                    *out = bias_value + matrix.dot_row(row_index, input);
                }
            }
        }

        if let Some(activation) = self.activation {
            activation.apply_in_place(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_layer_writes_output_region() {
        // buffer layout: [x0, x1 | y0, y1]
        let layer = DenseLayer::new(
            LayerWeights::Float(vec![vec![1.0, 2.0], vec![-1.0, 0.5]]),
            vec![0.5, 0.0],
            0,
            2,
            2,
            None,
        );
        let mut buffer = [1.0, 1.0, 0.0, 0.0];
        layer.apply(&mut buffer);
        assert_eq!(buffer, [1.0, 1.0, 3.5, -0.5]);
    }

    #[test]
    fn test_relu_is_applied_after_bias() {
        let layer = DenseLayer::new(
            LayerWeights::Float(vec![vec![-1.0]]),
            vec![0.25],
            0,
            1,
            1,
            Some(Activation::Relu),
        );
        let mut buffer = [2.0, 9.0];
        layer.apply(&mut buffer);
        assert_eq!(buffer[1], 0.0);
    }

    #[test]
    fn test_quantized_layer_tracks_float_layer() {
        let rows = vec![vec![0.3, -0.6, 0.9], vec![0.05, 0.1, -0.2]];
        let float_layer = DenseLayer::new(
            LayerWeights::Float(rows.clone()),
            vec![0.1, -0.1],
            0,
            3,
            3,
            None,
        );
        let quant_layer = DenseLayer::new(
            LayerWeights::Quantized(QuantizedMatrix::from_rows(&rows)),
            vec![0.1, -0.1],
            0,
            3,
            3,
            None,
        );
        assert!(quant_layer.is_quantized());

        let mut float_buffer = [0.5, -1.0, 2.0, 0.0, 0.0];
        let mut quant_buffer = float_buffer;
        float_layer.apply(&mut float_buffer);
        quant_layer.apply(&mut quant_buffer);
        for i in 3..5 {
            assert!((float_buffer[i] - quant_buffer[i]).abs() < 0.02);
        }
    }
}
