//! In-place element-wise kernels and the standalone activation kernel.

use crate::activation::Activation;
use crate::engine::Kernel;
use crate::errors::EngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemWiseOp {
    Add,
    Mul,
}

/// Adds or multiplies a parameter vector into a segment.
pub struct ElemWiseKernel {
    op: ElemWiseOp,
    parameters: Vec<f32>,
    output_ptr: usize,
}

impl ElemWiseKernel {
    pub fn new(op: ElemWiseOp, output_ptr: usize, parameters: &[f32]) -> Self {
        Self {
            op,
            parameters: parameters.to_vec(),
            output_ptr,
        }
    }
}

impl Kernel for ElemWiseKernel {
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()> {
        let segment = &mut buffer[self.output_ptr..self.output_ptr + self.parameters.len()];
        match self.op {
            ElemWiseOp::Add => segment
                .iter_mut()
                .zip(&self.parameters)
                .for_each(|(v, p)| *v += p),
            ElemWiseOp::Mul => segment
                .iter_mut()
                .zip(&self.parameters)
                .for_each(|(v, p)| *v *= p),
        }
        Ok(())
    }
}

/// Applies an activation to a segment.
pub struct ActivationKernel {
    activation: Activation,
    output_ptr: usize,
    data_size: usize,
}

impl ActivationKernel {
    pub fn new(activation: Activation, output_ptr: usize, data_size: usize) -> Self {
        Self {
            activation,
            output_ptr,
            data_size,
        }
    }
}

impl Kernel for ActivationKernel {
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()> {
        self.activation
            .apply_in_place(&mut buffer[self.output_ptr..self.output_ptr + self.data_size]);
        Ok(())
    }
}
