//! Fully connected kernel.

use crate::activation::Activation;
use crate::engine::Kernel;
use crate::errors::EngineResult;

/// Matrix-vector product plus bias, with an optional activation on the result.
///
/// Weights are stored flattened row-major so the hot loop walks contiguous memory.
pub struct DenseKernel {
    weights: Vec<f32>,
    bias: Vec<f32>,
    input_ptr: usize,
    input_size: usize,
    output_ptr: usize,
    output_size: usize,
    activation: Option<Activation>,
}

impl DenseKernel {
    pub fn new(
        input_ptr: usize,
        input_size: usize,
        output_ptr: usize,
        weights: &[Vec<f32>],
        bias: &[f32],
        activation: Option<Activation>,
    ) -> Self {
        Self {
            weights: weights.iter().flatten().copied().collect(),
            bias: bias.to_vec(),
            input_ptr,
            input_size,
            output_ptr,
            output_size: bias.len(),
            activation,
        }
    }
}

impl Kernel for DenseKernel {
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()> {
        for (row, &bias) in self.bias.iter().enumerate() {
            let weights_row = &self.weights[row * self.input_size..(row + 1) * self.input_size];
            let input = &buffer[self.input_ptr..self.input_ptr + self.input_size];
            let sum = weights_row
                .iter()
                .zip(input)
                .fold(bias, |acc, (w, x)| acc + w * x);
            buffer[self.output_ptr + row] = sum;
        }

        if let Some(activation) = self.activation {
            activation.apply_in_place(&mut buffer[self.output_ptr..self.output_ptr + self.output_size]);
        }
        Ok(())
    }
}
