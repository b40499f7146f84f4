//! Error types for the image preprocessing pipeline.

use thiserror::Error;

use crate::errors::TensorError;
use crate::preprocess::ImageFormat;

/// A per-image preprocessing failure. Non-fatal: the driver skips the sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessError {
    #[error("Unsupported conversion from {from:?} to {to:?}")]
    UnsupportedConversion { from: ImageFormat, to: ImageFormat },

    #[error("Pixel buffer too small for a {width}x{height} {format:?} image: {actual} < {required}")]
    BufferTooSmall {
        format: ImageFormat,
        width: usize,
        height: usize,
        required: usize,
        actual: usize,
    },

    #[error("Source image must have non-zero dimensions, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("Target tensor shape {shape:?} is not a single-batch 4D image tensor")]
    UnsupportedTensorShape { shape: Vec<usize> },

    #[error("Target tensor has {tensor_channels} channels but {format:?} produces {format_channels}")]
    ChannelMismatch {
        format: ImageFormat,
        format_channels: usize,
        tensor_channels: usize,
    },

    #[error("Transform maps destination pixel ({x}, {y}) to a non-finite source position")]
    NonFiniteCoordinate { x: usize, y: usize },

    #[error("Failed to decode image '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("Failed to write tensor: {0}")]
    Tensor(#[from] TensorError),
}

pub type PreprocessResult<T> = std::result::Result<T, PreprocessError>;
