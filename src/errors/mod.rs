//! Error types for the benchmark harness.
//!
//! Each concern has its own error enum so callers can tell fatal failures
//! (loading, tensor misuse, released sessions, empty sample sets) apart from
//! the per-sample failures that the measurement loop skips.

mod benchmark_error;
mod engine_error;
mod preprocess_error;
mod session_error;
mod tensor_error;

pub use benchmark_error::{
    BenchmarkError, BenchmarkResult, ConfigError, ConfigResult, StatisticsError,
    StatisticsResult,
};
pub use engine_error::{EngineError, EngineResult};
pub use preprocess_error::{PreprocessError, PreprocessResult};
pub use session_error::{
    LoadError, LoadErrorReason, LoadResult, SessionError, SessionResult,
};
pub use tensor_error::{TensorError, TensorResult};
