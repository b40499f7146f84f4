//! Measurement of one backend over an image set.

use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};

use crate::backends::Backend;
use crate::benchmark::config::BenchmarkConfig;
use crate::benchmark::report::BenchmarkReport;
use crate::benchmark::statistics::{self, TimingSamples};
use crate::errors::{BenchmarkError, BenchmarkResult};
use crate::preprocess::{ImageProcess, ImageSet};
use crate::session::Session;

/// Lifecycle of a single backend measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ModelLoading,
    Ready,
    Measuring,
    Aggregated,
    Released,
    Failed,
}

/// Samples collected by the measurement loop.
struct Measurement {
    samples: TimingSamples,
    skipped_inputs: usize,
}

/// Loads a model once, times every forward pass over the image set and turns
/// the durations into a [`BenchmarkReport`].
///
/// The loop is strictly sequential: one image is preprocessed into the input
/// tensor, one forward pass is timed, and only then does the next image start.
pub struct BenchmarkDriver {
    config: BenchmarkConfig,
    state: RunState,
}

impl BenchmarkDriver {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("Benchmark state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Measures `backend` on the model's sole input tensor.
    pub fn run(
        &mut self,
        backend: &dyn Backend,
        model_path: &Path,
        images: &ImageSet,
    ) -> BenchmarkResult<BenchmarkReport> {
        self.run_with_input(backend, model_path, None, images)
    }

    /// Measures `backend`, feeding the input tensor called `input_name`.
    pub fn run_with_input(
        &mut self,
        backend: &dyn Backend,
        model_path: &Path,
        input_name: Option<&str>,
        images: &ImageSet,
    ) -> BenchmarkResult<BenchmarkReport> {
        self.state = RunState::Idle;
        if images.is_empty() {
            self.transition(RunState::Failed);
            return Err(BenchmarkError::NoInputImages {
                folder: self
                    .config
                    .image_folder
                    .as_ref()
                    .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string()),
            });
        }

        self.transition(RunState::ModelLoading);
        let mut session = match backend.load(model_path, self.config.thread_count) {
            Ok(session) => session,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e.into());
            }
        };
        self.transition(RunState::Ready);

        match self.measure_and_aggregate(backend, &mut session, model_path, input_name, images) {
            Ok(report) => {
                session.release()?;
                self.transition(RunState::Released);
                info!(
                    "{}: {:.2} FPS over {} valid samples",
                    report.backend, report.fps, report.valid_samples
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(release_error) = session.release() {
                    warn!("Failed to release {} session: {}", backend.kind(), release_error);
                }
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    fn measure_and_aggregate(
        &mut self,
        backend: &dyn Backend,
        session: &mut Session,
        model_path: &Path,
        input_name: Option<&str>,
        images: &ImageSet,
    ) -> BenchmarkResult<BenchmarkReport> {
        let process = ImageProcess::new(
            backend.preprocess_config(&self.config.preprocess_config()),
            backend.input_layout(),
        );
        self.check_input_shape(backend, session, &process, input_name)?;

        self.transition(RunState::Measuring);
        let measurement = self.measure(session, &process, input_name, images)?;

        let aggregate = statistics::aggregate(&measurement.samples, self.config.warmup_count)?;
        self.transition(RunState::Aggregated);

        Ok(BenchmarkReport {
            backend: backend.kind(),
            model_path: model_path.to_path_buf(),
            thread_count: session.thread_count(),
            image_count: images.len(),
            repeat_count: self.config.repeat_count,
            warmup_count: self.config.warmup_count,
            recorded_calls: aggregate.recorded,
            failed_calls: measurement.samples.failed_count(),
            skipped_inputs: measurement.skipped_inputs,
            valid_samples: aggregate.used_ms.len(),
            mean_seconds: aggregate.mean_seconds,
            fps: aggregate.fps,
            latency: aggregate.latency,
        })
    }

    /// The input tensor must already have the configured image shape in the
    /// backend's layout.
    fn check_input_shape(
        &self,
        backend: &dyn Backend,
        session: &Session,
        process: &ImageProcess,
        input_name: Option<&str>,
    ) -> BenchmarkResult<()> {
        // Validated configurations never carry a planar destination.
        let channels = process.config().dest.channels().unwrap_or(0);
        let expected = process.layout().image_shape(
            self.config.input_height,
            self.config.input_width,
            channels,
        );
        let actual = session.input(input_name)?.shape();
        if actual != expected.as_slice() {
            return Err(BenchmarkError::InputShapeMismatch {
                backend: backend.kind(),
                expected,
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }

    fn measure(
        &self,
        session: &mut Session,
        process: &ImageProcess,
        input_name: Option<&str>,
        images: &ImageSet,
    ) -> BenchmarkResult<Measurement> {
        let mut samples = TimingSamples::with_capacity(self.config.repeat_count * images.len());
        let mut skipped_inputs = 0;

        for repeat in 0..self.config.repeat_count {
            for image in images.images() {
                let input = session.input_mut(input_name)?;
                if let Err(e) = process.convert_image(image, input) {
                    warn!("Skipping '{}' on repeat {}: {}", image.name(), repeat, e);
                    skipped_inputs += 1;
                    continue;
                }

                let start = Instant::now();
                let result = session.run();
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                match result {
                    Ok(()) => samples.record_success(elapsed_ms),
                    Err(e) if e.is_run_failure() => {
                        warn!("Forward pass on '{}' failed: {}", image.name(), e);
                        samples.record_failure();
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            debug!(
                "Repeat {}/{} done, {} calls recorded",
                repeat + 1,
                self.config.repeat_count,
                samples.len()
            );
        }

        Ok(Measurement {
            samples,
            skipped_inputs,
        })
    }
}
