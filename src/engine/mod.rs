//! In-crate tensor-execution engine used by the custom engine backend.
//!
//! A graph is a sequence of kernels that read from and write to segments of a
//! single unified computation buffer. The input occupies the first segment and
//! the output the last one.

mod dense_kernel;
mod elem_wise_kernel;
pub mod graph;
pub mod graph_info;
mod pooling_kernel;

use crate::errors::{EngineError, EngineResult};

pub use dense_kernel::DenseKernel;
pub use elem_wise_kernel::{ActivationKernel, ElemWiseKernel, ElemWiseOp};
pub use graph::EngineGraph;
pub use graph_info::{EngineGraphInfo, LayerInfo};
pub use pooling_kernel::{ChannelMeanKernel, CopyKernel};

/// Base trait for every kernel.
///
/// A kernel reads and writes fixed ranges of the computation buffer chosen
/// when the graph was validated.
pub trait Kernel: Send + Sync {
    /// Applies the kernel to the computation buffer.
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()>;
}

/// Segment layout shared by every kernel during construction.
pub(crate) struct SegmentLayout<'a> {
    pub offsets: &'a [usize],
    pub sizes: &'a [usize],
}

/// Validates a layer against the segment layout and the graph resources, then
/// builds its kernel.
pub(crate) fn create_kernel(
    layer: &LayerInfo,
    segments: &SegmentLayout<'_>,
    weights: &[Vec<Vec<f32>>],
    bias: &[Vec<f32>],
    parameters: &[Vec<f32>],
) -> EngineResult<Box<dyn Kernel>> {
    let offsets = segments.offsets;
    let sizes = segments.sizes;

    match layer {
        LayerInfo::Dense(info) => {
            if info.input == info.output {
                return Err(EngineError::SameInputOutputSegments {
                    layer: layer.type_name().to_string(),
                });
            }
            let matrix = weights
                .get(info.weights)
                .ok_or(EngineError::WeightsIndexOutOfBounds {
                    index: info.weights,
                })?;
            let bias_vector = bias
                .get(info.weights)
                .ok_or(EngineError::WeightsIndexOutOfBounds {
                    index: info.weights,
                })?;

            let input_size = sizes[info.input];
            let output_size = sizes[info.output];
            if matrix.len() != output_size {
                return Err(EngineError::WeightsRowSizeMismatch {
                    index: info.weights,
                    rows: matrix.len(),
                    output_size,
                });
            }
            if bias_vector.len() != output_size {
                return Err(EngineError::BiasOutputSizeMismatch {
                    index: info.weights,
                    bias_size: bias_vector.len(),
                    output_size,
                });
            }
            if let Some(row) = matrix.iter().find(|row| row.len() != input_size) {
                return Err(EngineError::WeightsColumnSizeMismatch {
                    index: info.weights,
                    columns: row.len(),
                    input_size,
                });
            }

            Ok(Box::new(DenseKernel::new(
                offsets[info.input],
                input_size,
                offsets[info.output],
                matrix,
                bias_vector,
                info.activation,
            )))
        }
        LayerInfo::Activation(info) => Ok(Box::new(ActivationKernel::new(
            info.activation,
            offsets[info.input],
            sizes[info.input],
        ))),
        LayerInfo::ElemWiseAdd(info) | LayerInfo::ElemWiseMul(info) => {
            let values = parameters
                .get(info.parameters)
                .ok_or(EngineError::ParametersIndexOutOfBounds {
                    index: info.parameters,
                })?;
            if values.len() != sizes[info.input] {
                return Err(EngineError::ParametersSizeMismatch {
                    index: info.parameters,
                    params_size: values.len(),
                    segment_size: sizes[info.input],
                });
            }
            let op = if matches!(layer, LayerInfo::ElemWiseAdd(_)) {
                ElemWiseOp::Add
            } else {
                ElemWiseOp::Mul
            };
            Ok(Box::new(ElemWiseKernel::new(op, offsets[info.input], values)))
        }
        LayerInfo::ChannelMean(info) => {
            if info.input == info.output {
                return Err(EngineError::SameInputOutputSegments {
                    layer: layer.type_name().to_string(),
                });
            }
            let input_size = sizes[info.input];
            let output_size = sizes[info.output];
            if info.channels == 0 || input_size % info.channels != 0 || output_size != info.channels
            {
                return Err(EngineError::InvalidChannelMean {
                    channels: info.channels,
                    input_size,
                    output_size,
                });
            }
            Ok(Box::new(ChannelMeanKernel::new(
                offsets[info.input],
                offsets[info.output],
                info.channels,
                input_size,
            )))
        }
        LayerInfo::Copy(info) => {
            if info.input == info.output {
                return Err(EngineError::SameInputOutputSegments {
                    layer: layer.type_name().to_string(),
                });
            }
            let data_size = sizes[info.input];
            let output_size = sizes[info.output];
            let end = info
                .internal_index
                .checked_add(data_size)
                .ok_or_else(|| EngineError::SizeOverflow {
                    what: "copy destination".to_string(),
                })?;
            if end > output_size {
                return Err(EngineError::CopyOutOfBounds {
                    offset: info.internal_index,
                    data_size,
                    output_size,
                });
            }
            Ok(Box::new(CopyKernel::new(
                offsets[info.input],
                offsets[info.output] + info.internal_index,
                data_size,
            )))
        }
    }
}
