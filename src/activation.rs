//! Activation functions applied by the reference network layers.

use serde::{Deserialize, Serialize};

/// Activation applied to a dense layer's output region.
/// A layer without an activation leaves its linear output untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    /// Rectified Linear Unit: f(x) = max(0, x).
    Relu,
    /// Hyperbolic tangent: f(x) = tanh(x).
    Tanh,
    /// Numerically stable softmax across the whole region:
    ///
    /// ```text
    /// Softmax(x_i) = exp(x_i - max(x)) / sum_j exp(x_j - max(x))
    /// ```
    Softmax,
}

impl Activation {
    /// Apply the activation function to a slice of values in place.
    pub fn apply_in_place(self, values: &mut [f32]) {
        match self {
            Activation::Relu => {
                for val in values.iter_mut() {
                    *val = val.max(0.0);
                }
            }
            Activation::Tanh => {
                for val in values.iter_mut() {
                    *val = val.tanh();
                }
            }
            Activation::Softmax => {
                if values.is_empty() {
                    return;
                }
                let max_val = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
                let mut sum = 0.0f32;

                for val in values.iter_mut() {
                    *val = (*val - max_val).exp();
                    sum += *val;
                }

                for val in values.iter_mut() {
                    *val /= sum;
                }
            }
        }
    }
}
