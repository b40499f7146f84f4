//! Benchmark configuration and its JSON loader.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::backends::BackendKind;
use crate::errors::{ConfigError, ConfigResult};
use crate::preprocess::{Filter, ImageFormat, PreprocessConfig, TensorLayout, Wrap};

/// One backend to measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEntry {
    pub kind: BackendKind,
    pub model_path: PathBuf,
    /// Overrides the backend's default input layout.
    #[serde(default)]
    pub layout: Option<TensorLayout>,
    /// Input tensor to feed. Models with a single input need no name.
    #[serde(default)]
    pub input_name: Option<String>,
}

/// Settings shared by every backend in a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub input_width: usize,
    pub input_height: usize,
    pub thread_count: usize,
    /// Passes over the whole image set.
    pub repeat_count: usize,
    /// Leading forward passes excluded from the statistics.
    pub warmup_count: usize,
    pub color_source_format: ImageFormat,
    pub color_dest_format: ImageFormat,
    pub resize_filter: Filter,
    pub edge_wrap: Wrap,
    pub mean: [f32; 4],
    pub normalize: [f32; 4],
    pub image_folder: Option<PathBuf>,
    pub backends: Vec<BackendEntry>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            input_width: 128,
            input_height: 128,
            thread_count: 4,
            repeat_count: 8,
            warmup_count: 4,
            color_source_format: ImageFormat::Rgba,
            color_dest_format: ImageFormat::Rgb,
            resize_filter: Filter::Nearest,
            edge_wrap: Wrap::ClampToEdge,
            mean: [0.0; 4],
            normalize: [1.0; 4],
            image_folder: None,
            backends: Vec::new(),
        }
    }
}

impl BenchmarkConfig {
    /// Validates the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("input_width", self.input_width),
            ("input_height", self.input_height),
            ("thread_count", self.thread_count),
            ("repeat_count", self.repeat_count),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "Must be greater than 0".to_string(),
                });
            }
        }

        if self.color_dest_format.channels().is_none() {
            return Err(ConfigError::Validation {
                field: "color_dest_format".to_string(),
                message: format!(
                    "{:?} cannot be used as a tensor format",
                    self.color_dest_format
                ),
            });
        }

        if self.normalize.iter().chain(&self.mean).any(|v| !v.is_finite()) {
            return Err(ConfigError::Validation {
                field: "normalize".to_string(),
                message: "Mean and normalize values must be finite".to_string(),
            });
        }

        for (i, entry) in self.backends.iter().enumerate() {
            if entry.model_path.as_os_str().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("backends[{i}].model_path"),
                    message: "Model path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Preprocessing settings derived from this configuration, before any
    /// backend-specific adjustment.
    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig::new()
            .with_source(self.color_source_format)
            .with_dest(self.color_dest_format)
            .with_filter(self.resize_filter)
            .with_wrap(self.edge_wrap)
            .with_mean(self.mean)
            .with_normal(self.normalize)
    }
}

/// Configuration loader that handles JSON files with fallbacks
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a JSON configuration, falling back to the defaults when the file
    /// does not exist.
    pub fn load_config<T>(path: &Path, config_name: &str) -> ConfigResult<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                source: e,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Config file '{}' not found, using default configuration for {}",
                    path.display(),
                    config_name
                );
                Ok(T::default())
            }
            Err(e) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Loads and validates a benchmark configuration.
    pub fn load_benchmark_config(path: &Path) -> ConfigResult<BenchmarkConfig> {
        let config: BenchmarkConfig = Self::load_config(path, "fps_benchmark")?;
        config.validate()?;
        Ok(config)
    }
}
