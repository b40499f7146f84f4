//! FPS benchmark CLI executable.
//!
//! Reads a JSON configuration naming an image folder and the backends to
//! measure, runs them one after another and prints the ranking (or JSON).
//!
//! This binary installs no native runtime, so only the custom engine backend
//! can load here. Native backends are measured by embedding the library and
//! calling `install_runtime` first.

use std::env;
use std::path::PathBuf;

use inference_bench::backends::BackendKind;
use inference_bench::benchmark::{
    BackendOutcome, BenchmarkSuite, ConfigLoader, print_performance_analysis,
};
use inference_bench::errors::BenchmarkResult;
use log::{error, info};

const DEFAULT_CONFIG_PATH: &str = "configs/fps_benchmark.json";

struct Options {
    config_path: PathBuf,
    json: bool,
}

fn main() {
    // Initialize logger
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Some(options) => options,
        None => return,
    };

    match run_benchmarks(&options) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            error!("Benchmark execution failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `None` when the arguments only asked for help or a listing.
fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        json: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--list" => {
                list_backends();
                return None;
            }
            "--help" | "-h" => {
                print_usage();
                return None;
            }
            "--json" => options.json = true,
            "--config" => match iter.next() {
                Some(path) => options.config_path = PathBuf::from(path),
                None => {
                    print_usage();
                    return None;
                }
            },
            path if !path.starts_with('-') => options.config_path = PathBuf::from(path),
            _ => {
                print_usage();
                return None;
            }
        }
    }
    Some(options)
}

/// Runs every configured backend. Returns whether all of them completed.
fn run_benchmarks(options: &Options) -> BenchmarkResult<bool> {
    let config = ConfigLoader::load_benchmark_config(&options.config_path)?;
    let suite = BenchmarkSuite::from_config(config);
    if suite.is_empty() {
        info!("No backends configured in {}", options.config_path.display());
        return Ok(true);
    }

    let images = suite.load_images()?;
    let outcomes = suite.run_all(&images);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcomes).map_err(std::io::Error::other)?);
    } else {
        print_performance_analysis(&outcomes);
        println!("\n{}", "=".repeat(80));
        println!("Benchmark Complete");
        println!("{}", "=".repeat(80));
    }

    Ok(outcomes
        .iter()
        .all(|outcome| matches!(outcome, BackendOutcome::Completed(_))))
}

fn list_backends() {
    println!("Available backends:");
    for kind in BackendKind::ALL {
        let description = match kind {
            BackendKind::CustomEngine => "Built-in engine, JSON graph models",
            BackendKind::MobileInterpreter => "Mobile interpreter flatbuffer models (runtime required)",
            BackendKind::GraphRuntime => "Graph runtime protobuf/ORT models (runtime required)",
            BackendKind::ScriptedModule => "Scripted module archives (runtime required)",
        };
        println!("  {:<20}- {}", kind.name(), description);
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  cargo run --bin fps_benchmark --release                       # Use {DEFAULT_CONFIG_PATH}");
    println!("  cargo run --bin fps_benchmark --release -- <config.json>      # Use another config");
    println!("  cargo run --bin fps_benchmark --release -- --config <path>");
    println!("  cargo run --bin fps_benchmark --release -- --json             # Print JSON results");
    println!("  cargo run --bin fps_benchmark --release -- --list             # List backends");
}
