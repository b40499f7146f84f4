//! Validated, executable engine graph.

use log::debug;

use crate::engine::graph_info::{EngineGraphInfo, LayerInfo};
use crate::engine::{Kernel, SegmentLayout, create_kernel};
use crate::errors::{EngineError, EngineResult};

/// Maximum number of f32 values in the unified computation buffer.
pub const MAX_COMPUTATION_BUFFER_SIZE: usize = 16_000_000;

/// A graph whose layers have all been validated and turned into kernels.
///
/// The graph itself is immutable; callers own the computation buffer and may
/// reuse it across predictions.
pub struct EngineGraph {
    kernels: Vec<Box<dyn Kernel>>,
    input_shape: Vec<usize>,
    input_name: String,
    output_name: String,
    segment_sizes: Vec<usize>,
    output_start: usize,
    required_memory: usize,
}

impl std::fmt::Debug for EngineGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineGraph")
            .field("kernels", &self.kernels.len())
            .field("input_shape", &self.input_shape)
            .field("segment_sizes", &self.segment_sizes)
            .finish()
    }
}

impl EngineGraph {
    pub fn new(info: EngineGraphInfo) -> EngineResult<Self> {
        Self::validate_inputs(&info)?;

        let (offsets, required_memory) = Self::segment_offsets(&info.segment_sizes)?;
        if required_memory > MAX_COMPUTATION_BUFFER_SIZE {
            return Err(EngineError::ComputationBufferSizeExceedsLimit {
                actual: required_memory,
                max: MAX_COMPUTATION_BUFFER_SIZE,
            });
        }
        let output_start = required_memory - info.segment_sizes[info.segment_sizes.len() - 1];

        let kernels = Self::validate_and_create_kernels(&info, &offsets)?;
        debug!(
            "Built engine graph: {} kernels, {} segments, {} buffer values",
            kernels.len(),
            info.segment_sizes.len(),
            required_memory
        );

        Ok(Self {
            kernels,
            input_shape: info.input_shape,
            input_name: info.input_name,
            output_name: info.output_name,
            segment_sizes: info.segment_sizes,
            output_start,
            required_memory,
        })
    }

    fn validate_inputs(info: &EngineGraphInfo) -> EngineResult<()> {
        if info.segment_sizes.is_empty() {
            return Err(EngineError::NoSegmentsProvided);
        }
        if info.layers.is_empty() {
            return Err(EngineError::NoLayersProvided);
        }
        if info.bias.len() != info.weights.len() {
            return Err(EngineError::BiasWeightsMismatch {
                bias: info.bias.len(),
                weights: info.weights.len(),
            });
        }

        let elements = info
            .input_shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| EngineError::SizeOverflow {
                what: "input shape".to_string(),
            })?;
        if info.input_shape.is_empty() || elements != info.segment_sizes[0] {
            return Err(EngineError::InputShapeMismatch {
                shape: info.input_shape.clone(),
                elements,
                segment_size: info.segment_sizes[0],
            });
        }
        Ok(())
    }

    /// Returns the start of every segment and the total number of values.
    fn segment_offsets(sizes: &[usize]) -> EngineResult<(Vec<usize>, usize)> {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut index = 0usize;
        for (i, &size) in sizes.iter().enumerate() {
            if size == 0 {
                return Err(EngineError::EmptySegment { index: i });
            }
            offsets.push(index);
            index = index
                .checked_add(size)
                .ok_or_else(|| EngineError::SizeOverflow {
                    what: "computation segments".to_string(),
                })?;
        }
        Ok((offsets, index))
    }

    fn validate_and_create_kernels(
        info: &EngineGraphInfo,
        offsets: &[usize],
    ) -> EngineResult<Vec<Box<dyn Kernel>>> {
        let layout = SegmentLayout {
            offsets,
            sizes: &info.segment_sizes,
        };
        let mut used_weights = vec![false; info.weights.len()];
        let mut used_parameters = vec![false; info.parameters.len()];
        let mut kernels = Vec::with_capacity(info.layers.len());

        for layer in &info.layers {
            for input in layer.inputs() {
                Self::validate_segment_index("input", input, offsets.len())?;
            }
            Self::validate_segment_index("output", layer.output(), offsets.len())?;

            kernels.push(create_kernel(
                layer,
                &layout,
                &info.weights,
                &info.bias,
                &info.parameters,
            )?);

            match layer {
                LayerInfo::Dense(dense) => used_weights[dense.weights] = true,
                LayerInfo::ElemWiseAdd(elem) | LayerInfo::ElemWiseMul(elem) => {
                    used_parameters[elem.parameters] = true
                }
                _ => {}
            }
        }

        if let Some(index) = used_weights.iter().position(|used| !used) {
            return Err(EngineError::UnusedWeights { index });
        }
        if let Some(index) = used_parameters.iter().position(|used| !used) {
            return Err(EngineError::UnusedParameters { index });
        }
        Ok(kernels)
    }

    fn validate_segment_index(label: &str, index: usize, count: usize) -> EngineResult<()> {
        if index >= count {
            return Err(EngineError::SegmentIndexOutOfBounds {
                label: label.to_string(),
                index,
            });
        }
        Ok(())
    }

    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Number of values the input segment holds.
    pub fn input_size(&self) -> usize {
        self.segment_sizes[0]
    }

    /// Number of values the output segment holds.
    pub fn output_size(&self) -> usize {
        self.segment_sizes[self.segment_sizes.len() - 1]
    }

    /// Size of the computation buffer needed by [`EngineGraph::predict_with_buffer`].
    pub fn required_memory(&self) -> usize {
        self.required_memory
    }

    /// Runs the graph using a caller-owned computation buffer and returns a view
    /// of the output segment inside it.
    pub fn predict_with_buffer<'a>(
        &self,
        input: &[f32],
        buffer: &'a mut [f32],
    ) -> EngineResult<&'a [f32]> {
        if input.len() != self.input_size() {
            return Err(EngineError::InputSizeMismatch {
                provided: input.len(),
                expected: self.input_size(),
            });
        }
        if buffer.len() < self.required_memory {
            return Err(EngineError::ComputationBufferTooSmall {
                buffer_size: buffer.len(),
                required_size: self.required_memory,
            });
        }

        buffer[..input.len()].copy_from_slice(input);
        for kernel in &self.kernels {
            kernel.apply(buffer)?;
        }
        Ok(&buffer[self.output_start..self.required_memory])
    }

    /// Runs the graph with a freshly allocated buffer.
    pub fn predict(&self, input: &[f32]) -> EngineResult<Vec<f32>> {
        let mut buffer = vec![0.0f32; self.required_memory];
        Ok(self.predict_with_buffer(input, &mut buffer)?.to_vec())
    }
}
