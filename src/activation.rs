//! Activation functions used by the custom engine's kernels.

use serde::{Deserialize, Serialize};

/// Activation applied to a computation segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    /// f(x) = max(0, x).
    Relu,
    /// f(x) = 1 / (1 + exp(-x)).
    Sigmoid,
    /// Numerically stable softmax over the whole segment:
    ///
    /// ```text
    /// Softmax(x_i) = exp(x_i - max(x)) / sum_j exp(x_j - max(x))
    /// ```
    Softmax,
    /// f(x) = tanh(x).
    Tanh,
}

impl Activation {
    /// Applies the activation to a slice of values in place.
    pub fn apply_in_place(self, values: &mut [f32]) {
        match self {
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Sigmoid => values
                .iter_mut()
                .for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Softmax => {
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
