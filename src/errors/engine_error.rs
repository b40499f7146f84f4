//! Error types for the custom tensor-execution engine.

use thiserror::Error;

/// Errors that can occur while validating or executing an engine graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("At least one computation segment is required")]
    NoSegmentsProvided,

    #[error("At least one layer is required")]
    NoLayersProvided,

    #[error("Segment {index} has size 0")]
    EmptySegment { index: usize },

    #[error("Input shape {shape:?} holds {elements} elements but the input segment holds {segment_size}")]
    InputShapeMismatch {
        shape: Vec<usize>,
        elements: usize,
        segment_size: usize,
    },

    #[error("Size of {what} overflows the address space")]
    SizeOverflow { what: String },

    #[error("The computation buffer size exceeds the maximum allowed elements: {actual} > {max}")]
    ComputationBufferSizeExceedsLimit { actual: usize, max: usize },

    #[error("The numbers of bias and weights must be the same: {bias} != {weights}")]
    BiasWeightsMismatch { bias: usize, weights: usize },

    #[error("The {label} segment {index} does not exist")]
    SegmentIndexOutOfBounds { label: String, index: usize },

    #[error("The weights {index} must be within the number of weights")]
    WeightsIndexOutOfBounds { index: usize },

    #[error("The parameters {index} must be within the number of parameters")]
    ParametersIndexOutOfBounds { index: usize },

    #[error("Weights {index} have {rows} rows but the output segment holds {output_size}")]
    WeightsRowSizeMismatch {
        index: usize,
        rows: usize,
        output_size: usize,
    },

    #[error("Weights {index} have a row of {columns} columns but the input segment holds {input_size}")]
    WeightsColumnSizeMismatch {
        index: usize,
        columns: usize,
        input_size: usize,
    },

    #[error("Bias {index} has {bias_size} values but the output segment holds {output_size}")]
    BiasOutputSizeMismatch {
        index: usize,
        bias_size: usize,
        output_size: usize,
    },

    #[error("Parameters {index} have {params_size} values but the target segment holds {segment_size}")]
    ParametersSizeMismatch {
        index: usize,
        params_size: usize,
        segment_size: usize,
    },

    #[error("The input and output segments must be different on a {layer} layer")]
    SameInputOutputSegments { layer: String },

    #[error("Copy of {data_size} values at offset {offset} overflows the output segment of size {output_size}")]
    CopyOutOfBounds {
        offset: usize,
        data_size: usize,
        output_size: usize,
    },

    #[error("Channel mean over {channels} channels requires the input segment size {input_size} to be divisible and the output segment to hold {channels} values (holds {output_size})")]
    InvalidChannelMean {
        channels: usize,
        input_size: usize,
        output_size: usize,
    },

    #[error("The weights at index {index} are not used")]
    UnusedWeights { index: usize },

    #[error("The parameters at index {index} are not used")]
    UnusedParameters { index: usize },

    #[error("Input has {provided} values but the graph expects {expected}")]
    InputSizeMismatch { provided: usize, expected: usize },

    #[error("Computation buffer is not large enough: {buffer_size} < {required_size}")]
    ComputationBufferTooSmall {
        buffer_size: usize,
        required_size: usize,
    },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
