//! Sequential measurement of several backends.

use std::path::PathBuf;

use log::{error, info};

use crate::backends::{Backend, create_backend};
use crate::benchmark::config::BenchmarkConfig;
use crate::benchmark::driver::BenchmarkDriver;
use crate::benchmark::report::BackendOutcome;
use crate::errors::{BenchmarkError, BenchmarkResult};
use crate::preprocess::ImageSet;

struct SuiteEntry {
    backend: Box<dyn Backend>,
    model_path: PathBuf,
    input_name: Option<String>,
}

/// Runs backends one after another. Each one is fully measured and released
/// before the next is loaded.
pub struct BenchmarkSuite {
    config: BenchmarkConfig,
    entries: Vec<SuiteEntry>,
}

impl BenchmarkSuite {
    /// A suite with no backends.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// A suite with one adapter per configured backend entry.
    pub fn from_config(config: BenchmarkConfig) -> Self {
        let entries = config
            .backends
            .iter()
            .map(|entry| SuiteEntry {
                backend: create_backend(entry.kind, entry.layout),
                model_path: entry.model_path.clone(),
                input_name: entry.input_name.clone(),
            })
            .collect();
        Self { config, entries }
    }

    pub fn add_backend(
        &mut self,
        backend: Box<dyn Backend>,
        model_path: impl Into<PathBuf>,
        input_name: Option<String>,
    ) {
        self.entries.push(SuiteEntry {
            backend,
            model_path: model_path.into(),
            input_name,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes the configured image folder.
    pub fn load_images(&self) -> BenchmarkResult<ImageSet> {
        let folder = self
            .config
            .image_folder
            .as_ref()
            .ok_or_else(|| BenchmarkError::NoInputImages {
                folder: "<unset>".to_string(),
            })?;
        let images = ImageSet::from_folder(folder)?;
        if images.is_empty() {
            return Err(BenchmarkError::NoInputImages {
                folder: folder.display().to_string(),
            });
        }
        info!("Loaded {} images from {}", images.len(), folder.display());
        Ok(images)
    }

    /// Measures every backend. A fatal error is reported as a failed outcome
    /// and the remaining backends still run.
    pub fn run_all(&self, images: &ImageSet) -> Vec<BackendOutcome> {
        info!("Starting benchmark suite with {} backends", self.entries.len());
        let mut driver = BenchmarkDriver::new(self.config.clone());

        self.entries
            .iter()
            .map(|entry| {
                match driver.run_with_input(
                    entry.backend.as_ref(),
                    &entry.model_path,
                    entry.input_name.as_deref(),
                    images,
                ) {
                    Ok(report) => BackendOutcome::Completed(report),
                    Err(e) => {
                        error!("{} benchmark failed: {}", entry.backend.kind(), e);
                        BackendOutcome::Failed {
                            backend: entry.backend.kind(),
                            model_path: entry.model_path.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect()
    }
}
