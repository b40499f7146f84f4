//! Throughput measurement across backends.

pub mod config;
pub mod driver;
pub mod report;
pub mod statistics;
pub mod suite;

pub use config::{BackendEntry, BenchmarkConfig, ConfigLoader};
pub use driver::{BenchmarkDriver, RunState};
pub use report::{BackendOutcome, BenchmarkReport, print_performance_analysis};
pub use statistics::{
    Aggregate, INVALID_FPS, LatencyStats, MIN_MEAN_SECONDS, TimingSamples, aggregate,
    fps_from_mean, mean_seconds,
};
pub use suite::BenchmarkSuite;
