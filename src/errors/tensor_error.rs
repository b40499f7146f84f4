//! Error types for tensor operations.

use thiserror::Error;

use crate::tensor::DataType;

/// Errors raised by shape and data operations on a [`crate::tensor::Tensor`].
///
/// These are programming or configuration errors and are fatal for a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("Invalid tensor shape {shape:?}: every dimension must be greater than 0")]
    ShapeError { shape: Vec<usize> },

    #[error("Tensor element type mismatch: tensor holds {expected:?} but {actual:?} values were provided")]
    TypeMismatch { expected: DataType, actual: DataType },

    #[error("Tensor size mismatch: shape requires {expected} elements but {actual} were provided")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type TensorResult<T> = std::result::Result<T, TensorError>;
