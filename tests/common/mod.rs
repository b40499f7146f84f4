//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use inference_bench::backends::{NativeModel, NativeRuntime, RuntimeOptions};
use inference_bench::benchmark::BenchmarkConfig;
use inference_bench::preprocess::{DecodedImage, ImageFormat, ImageSet};
use inference_bench::session::{ModelHandle, NamedTensor, TensorSpec};
use inference_bench::tensor::DataType;

/// Counters shared between a mock runtime and the test that owns it.
#[derive(Debug, Default)]
pub struct CallCounters {
    pub loads: AtomicUsize,
    pub runs: AtomicUsize,
}

impl CallCounters {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

/// Native runtime double. Every forward pass sleeps briefly so durations are
/// measurable, and the 1-based calls listed in `fail_on` report an error.
pub struct MockRuntime {
    pub name: String,
    pub input: TensorSpec,
    pub extra_inputs: Vec<TensorSpec>,
    pub fail_on: Vec<usize>,
    pub load_error: Option<String>,
    pub delay: Duration,
    pub counters: Arc<CallCounters>,
}

impl MockRuntime {
    pub fn new(input: TensorSpec) -> Self {
        Self {
            name: "mock".to_string(),
            input,
            extra_inputs: Vec::new(),
            fail_on: Vec::new(),
            load_error: None,
            delay: Duration::from_millis(1),
            counters: Arc::new(CallCounters::default()),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Declares another model input after the primary one.
    pub fn with_extra_input(mut self, spec: TensorSpec) -> Self {
        self.extra_inputs.push(spec);
        self
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }

    pub fn failing_load(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self
    }
}

struct MockHandle {
    expected_dtype: DataType,
    fail_on: Vec<usize>,
    delay: Duration,
    counters: Arc<CallCounters>,
}

impl ModelHandle for MockHandle {
    fn run(&mut self, inputs: &[NamedTensor], outputs: &mut [NamedTensor]) -> Result<(), String> {
        let call = self.counters.runs.fetch_add(1, Ordering::SeqCst) + 1;
        thread::sleep(self.delay);
        if self.fail_on.contains(&call) {
            return Err(format!("injected failure on call {call}"));
        }
        let input = &inputs[0].tensor;
        if input.dtype() != self.expected_dtype {
            return Err(format!("unexpected input type {:?}", input.dtype()));
        }
        let sum: f32 = input.read_float().iter().sum();
        outputs[0]
            .tensor
            .set_data(&[sum, call as f32])
            .map_err(|e| e.to_string())
    }
}

impl NativeRuntime for MockRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _model: &[u8], _options: &RuntimeOptions) -> Result<NativeModel, String> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.load_error {
            return Err(message.clone());
        }
        Ok(NativeModel {
            inputs: std::iter::once(self.input.clone())
                .chain(self.extra_inputs.iter().cloned())
                .collect(),
            outputs: vec![TensorSpec::new("scores", vec![1, 2], DataType::Float32)],
            handle: Box::new(MockHandle {
                expected_dtype: self.input.dtype,
                fail_on: self.fail_on.clone(),
                delay: self.delay,
                counters: Arc::clone(&self.counters),
            }),
        })
    }
}

pub fn interpreter_model_bytes() -> Vec<u8> {
    let mut bytes = vec![0x1c, 0, 0, 0];
    bytes.extend_from_slice(b"TFL3");
    bytes.extend_from_slice(&[0; 16]);
    bytes
}

pub fn graph_model_bytes() -> Vec<u8> {
    vec![0x08, 0x07, 0x12, 0x04, b't', b'e', b's', b't']
}

pub fn scripted_module_bytes() -> Vec<u8> {
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0; 26]);
    bytes
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// `count` solid-colour RGBA images of the given size.
pub fn solid_images(count: usize, width: usize, height: usize) -> ImageSet {
    let images = (0..count)
        .map(|i| {
            let shade = (i * 40) as u8;
            let rgba = [shade, 255 - shade, 128, 255].repeat(width * height);
            DecodedImage::from_rgba(format!("image_{i}.png"), width, height, rgba).unwrap()
        })
        .collect();
    ImageSet::from_images(images)
}

pub fn small_config(size: usize, repeat_count: usize, warmup_count: usize) -> BenchmarkConfig {
    BenchmarkConfig {
        input_width: size,
        input_height: size,
        thread_count: 2,
        repeat_count,
        warmup_count,
        color_source_format: ImageFormat::Rgba,
        color_dest_format: ImageFormat::Rgb,
        ..BenchmarkConfig::default()
    }
}

/// A valid engine graph: global average pooling over a `[1, 3, size, size]`
/// input followed by a two-class dense layer with softmax.
pub fn pooled_classifier_json(size: usize) -> String {
    format!(
        r#"{{
            "input_shape": [1, 3, {size}, {size}],
            "segment_sizes": [{input}, 3, 2],
            "layers": [
                {{"type": "CHANNEL_MEAN", "input": 0, "output": 1, "channels": 3}},
                {{"type": "DENSE", "input": 1, "output": 2, "weights": 0, "activation": "SOFTMAX"}}
            ],
            "weights": [[[0.01, 0.0, 0.0], [0.0, 0.01, 0.0]]],
            "bias": [[0.0, 0.0]]
        }}"#,
        input = 3 * size * size
    )
}
