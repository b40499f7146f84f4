//! Inference throughput benchmark harness.
//!
//! Loads one model per backend, feeds it a folder of images through a
//! configurable preprocessing pipeline, times every forward pass and reports
//! frames per second. Backends are driven through the [`backends::Backend`]
//! trait: a built-in tensor-execution engine plus adapters for native runtimes
//! supplied by the embedding application.

pub mod activation;
pub mod backends;
pub mod benchmark;
pub mod engine;
pub mod errors;
pub mod preprocess;
pub mod session;
pub mod tensor;

pub use activation::Activation;
pub use backends::{Backend, BackendKind, create_backend};
pub use benchmark::{BenchmarkConfig, BenchmarkDriver, BenchmarkReport, BenchmarkSuite};
pub use preprocess::{ImageProcess, PreprocessConfig, TensorLayout};
pub use session::Session;
pub use tensor::{DataType, Tensor};
