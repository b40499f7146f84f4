//! Error types for benchmark configuration, statistics and runs.

use thiserror::Error;

use crate::backends::BackendKind;
use crate::errors::{LoadError, SessionError, TensorError};

/// Errors raised while reading or validating a benchmark configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Configuration validation error for field '{field}': {message}")]
    Validation { field: String, message: String },
}

/// Errors raised while turning timing samples into a throughput figure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatisticsError {
    #[error(
        "Not enough samples: {recorded} calls recorded, {warmup} discarded as warm-up, {valid} valid samples remain"
    )]
    InsufficientSamples {
        recorded: usize,
        warmup: usize,
        valid: usize,
    },
}

/// Fatal errors that abort the measurement of one backend.
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Tensor error: {0}")]
    Tensor(#[from] TensorError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(
        "{backend} input tensor has shape {actual:?} but the configuration requires {expected:?}"
    )]
    InputShapeMismatch {
        backend: BackendKind,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("No input images available in '{folder}'")]
    NoInputImages { folder: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type StatisticsResult<T> = std::result::Result<T, StatisticsError>;
pub type BenchmarkResult<T> = std::result::Result<T, BenchmarkError>;
