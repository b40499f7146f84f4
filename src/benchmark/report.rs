//! Per-backend results and their console presentation.

use std::path::PathBuf;

use serde::Serialize;

use crate::backends::BackendKind;
use crate::benchmark::statistics::LatencyStats;

/// Completed measurement of one backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub backend: BackendKind,
    pub model_path: PathBuf,
    pub thread_count: usize,
    pub image_count: usize,
    pub repeat_count: usize,
    pub warmup_count: usize,
    /// Forward passes issued, failed ones included.
    pub recorded_calls: usize,
    /// Failed forward passes across the whole run.
    pub failed_calls: usize,
    /// Images that could not be preprocessed. No forward pass was issued for them.
    pub skipped_inputs: usize,
    /// Successful durations that entered the statistics.
    pub valid_samples: usize,
    pub mean_seconds: f64,
    /// Frames per second, or -1 when the mean duration is too small to measure.
    pub fps: f64,
    pub latency: LatencyStats,
}

/// Outcome of one backend in a suite run. A failed backend carries no FPS.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendOutcome {
    Completed(BenchmarkReport),
    Failed {
        backend: BackendKind,
        model_path: PathBuf,
        error: String,
    },
}

impl BackendOutcome {
    pub fn backend(&self) -> BackendKind {
        match self {
            BackendOutcome::Completed(report) => report.backend,
            BackendOutcome::Failed { backend, .. } => *backend,
        }
    }

    pub fn fps(&self) -> Option<f64> {
        match self {
            BackendOutcome::Completed(report) => Some(report.fps),
            BackendOutcome::Failed { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&BenchmarkReport> {
        match self {
            BackendOutcome::Completed(report) => Some(report),
            BackendOutcome::Failed { .. } => None,
        }
    }
}

/// Prints detailed performance analysis
pub fn print_performance_analysis(outcomes: &[BackendOutcome]) {
    if outcomes.is_empty() {
        return;
    }

    println!("\n{}", "=".repeat(80));
    println!("Detailed Results");
    println!("{}", "=".repeat(80));

    for outcome in outcomes {
        match outcome {
            BackendOutcome::Completed(report) => {
                println!("\n📊 {} ({})", report.backend, report.model_path.display());
                println!("   FPS: {:.2}", report.fps);
                println!(
                    "   Mean latency: {:.3} ms (min {:.3}, median {:.3}, max {:.3}, std-dev {:.3})",
                    report.mean_seconds * 1000.0,
                    report.latency.min_ms,
                    report.latency.median_ms,
                    report.latency.max_ms,
                    report.latency.std_dev_ms
                );
                println!(
                    "   Calls: {} recorded, {} warm-up, {} failed, {} valid",
                    report.recorded_calls,
                    report.warmup_count,
                    report.failed_calls,
                    report.valid_samples
                );
                if report.skipped_inputs > 0 {
                    println!("   Skipped inputs: {}", report.skipped_inputs);
                }
                println!(
                    "   Images: {} x {} repeats, {} threads",
                    report.image_count, report.repeat_count, report.thread_count
                );
            }
            BackendOutcome::Failed {
                backend,
                model_path,
                error,
            } => {
                println!("\n❌ {} ({})", backend, model_path.display());
                println!("   Failed: {error}");
            }
        }
    }

    let mut ranked: Vec<&BenchmarkReport> = outcomes
        .iter()
        .filter_map(BackendOutcome::report)
        .filter(|r| r.fps > 0.0)
        .collect();
    if ranked.is_empty() {
        return;
    }

    println!("\n{}", "=".repeat(80));
    println!("Performance Analysis");
    println!("{}", "=".repeat(80));

    println!("\n🚀 Speed Rankings (fastest to slowest):");
    ranked.sort_by(|a, b| b.fps.total_cmp(&a.fps));
    for (i, report) in ranked.iter().enumerate() {
        let rank_emoji = match i {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "  ",
        };
        println!("   {} {}: {:.2} FPS", rank_emoji, report.backend, report.fps);
    }

    if let [fastest, .., slowest] = ranked.as_slice() {
        println!("\n📈 Spread:");
        println!(
            "   {} is {:.2}x faster than {}",
            fastest.backend,
            fastest.fps / slowest.fps,
            slowest.backend
        );
    }
}
