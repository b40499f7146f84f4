//! End-to-end tests of the measurement loop.

mod common;

use std::sync::Arc;

use common::{
    MockRuntime, graph_model_bytes, interpreter_model_bytes, pooled_classifier_json, small_config,
    solid_images, write_file,
};
use inference_bench::backends::{
    Backend, BackendKind, CustomEngineBackend, GraphRuntimeBackend, MobileInterpreterBackend,
};
use inference_bench::benchmark::{BackendOutcome, BenchmarkDriver, BenchmarkSuite, RunState};
use inference_bench::errors::{BenchmarkError, LoadErrorReason};
use inference_bench::preprocess::ImageSet;
use inference_bench::session::TensorSpec;
use inference_bench::tensor::DataType;

const SIZE: usize = 8;

fn nchw_input() -> TensorSpec {
    TensorSpec::new("pixels", vec![1, 3, SIZE, SIZE], DataType::Float32)
}

#[test]
fn test_four_images_two_repeats_one_warmup() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.onnx", &graph_model_bytes());
    let runtime = MockRuntime::new(nchw_input());
    let counters = Arc::clone(&runtime.counters);
    let backend = GraphRuntimeBackend::new().with_runtime(Arc::new(runtime));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 2, 1));
    let report = driver.run(&backend, &model, &solid_images(4, 16, 12)).unwrap();

    assert_eq!(counters.loads(), 1);
    assert_eq!(counters.runs(), 8);
    assert_eq!(report.backend, BackendKind::GraphRuntime);
    assert_eq!(report.recorded_calls, 8);
    assert_eq!(report.valid_samples, 7);
    assert_eq!(report.failed_calls, 0);
    assert_eq!(report.skipped_inputs, 0);
    assert!(report.fps.is_finite() && report.fps > 0.0);
    // Every call sleeps at least one millisecond.
    assert!(report.latency.min_ms >= 1.0);
    assert!(report.fps <= 1000.0);
    assert_eq!(driver.state(), RunState::Released);
}

#[test]
fn test_run_failures_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.onnx", &graph_model_bytes());
    // Call 1 is the warm-up slot, call 5 falls in the measured window.
    let runtime = MockRuntime::new(nchw_input()).failing_on(&[1, 5]);
    let backend = GraphRuntimeBackend::new().with_runtime(Arc::new(runtime));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 2, 1));
    let report = driver.run(&backend, &model, &solid_images(4, 8, 8)).unwrap();

    assert_eq!(report.recorded_calls, 8);
    assert_eq!(report.failed_calls, 2);
    assert_eq!(report.valid_samples, 6);
    assert!(report.fps.is_finite() && report.fps > 0.0);
}

#[test]
fn test_missing_model_never_measures() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = MockRuntime::new(nchw_input());
    let counters = Arc::clone(&runtime.counters);
    let backend = GraphRuntimeBackend::new().with_runtime(Arc::new(runtime));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 2, 1));
    let result = driver.run(
        &backend,
        &dir.path().join("absent.onnx"),
        &solid_images(2, 8, 8),
    );

    match result {
        Err(BenchmarkError::Load(e)) => assert_eq!(e.reason, LoadErrorReason::FileNotFound),
        other => panic!("expected a load error, got {other:?}"),
    }
    assert_eq!(counters.loads(), 0);
    assert_eq!(counters.runs(), 0);
    assert_eq!(driver.state(), RunState::Failed);
}

#[test]
fn test_input_shape_mismatch_is_fatal_before_measuring() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.onnx", &graph_model_bytes());
    let runtime = MockRuntime::new(TensorSpec::new(
        "pixels",
        vec![1, 3, 32, 32],
        DataType::Float32,
    ));
    let counters = Arc::clone(&runtime.counters);
    let backend = GraphRuntimeBackend::new().with_runtime(Arc::new(runtime));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 1, 0));
    let result = driver.run(&backend, &model, &solid_images(2, 8, 8));

    assert!(matches!(
        result,
        Err(BenchmarkError::InputShapeMismatch { backend: BackendKind::GraphRuntime, .. })
    ));
    assert_eq!(counters.runs(), 0);
    assert_eq!(driver.state(), RunState::Failed);
}

#[test]
fn test_warmup_swallowing_every_sample_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.onnx", &graph_model_bytes());
    let backend =
        GraphRuntimeBackend::new().with_runtime(Arc::new(MockRuntime::new(nchw_input())));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 1, 3));
    let result = driver.run(&backend, &model, &solid_images(2, 8, 8));

    assert!(matches!(result, Err(BenchmarkError::Statistics(_))));
    assert_eq!(driver.state(), RunState::Failed);
}

#[test]
fn test_empty_image_set_is_rejected() {
    let backend = CustomEngineBackend::new();
    let mut driver = BenchmarkDriver::new(small_config(SIZE, 1, 0));
    let result = driver.run(
        &backend,
        std::path::Path::new("unused.json"),
        &ImageSet::from_images(Vec::new()),
    );
    assert!(matches!(result, Err(BenchmarkError::NoInputImages { .. })));
}

#[test]
fn test_quantized_channel_last_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.tflite", &interpreter_model_bytes());
    let runtime = MockRuntime::new(TensorSpec::new(
        "image",
        vec![1, SIZE, SIZE, 3],
        DataType::Uint8,
    ));
    let backend = MobileInterpreterBackend::new().with_runtime(Arc::new(runtime));

    let mut driver = BenchmarkDriver::new(small_config(SIZE, 1, 0));
    let report = driver.run(&backend, &model, &solid_images(3, 8, 8)).unwrap();

    // The mock rejects inputs whose element type differs from the declared one.
    assert_eq!(report.failed_calls, 0);
    assert_eq!(report.valid_samples, 3);
}

#[test]
fn test_custom_engine_end_to_end() {
    let size = 64;
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(
        dir.path(),
        "classifier.json",
        pooled_classifier_json(size).as_bytes(),
    );

    let mut driver = BenchmarkDriver::new(small_config(size, 2, 1));
    let report = driver
        .run(&CustomEngineBackend::new(), &model, &solid_images(2, 32, 32))
        .unwrap();

    assert_eq!(report.backend, BackendKind::CustomEngine);
    assert_eq!(report.recorded_calls, 4);
    assert_eq!(report.valid_samples, 3);
    assert!(report.fps > 0.0);
}

#[test]
fn test_suite_reports_failures_without_fps() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_file(dir.path(), "net.onnx", &graph_model_bytes());
    let working: Box<dyn Backend> = Box::new(
        GraphRuntimeBackend::new().with_runtime(Arc::new(MockRuntime::new(nchw_input()))),
    );
    let broken: Box<dyn Backend> = Box::new(
        GraphRuntimeBackend::new()
            .with_runtime(Arc::new(MockRuntime::new(nchw_input()).failing_load("bad ops"))),
    );

    let mut suite = BenchmarkSuite::new(small_config(SIZE, 1, 0));
    suite.add_backend(broken, model.clone(), None);
    suite.add_backend(working, model, Some("pixels".to_string()));
    let outcomes = suite.run_all(&solid_images(2, 8, 8));

    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        BackendOutcome::Failed { backend, error, .. } => {
            assert_eq!(*backend, BackendKind::GraphRuntime);
            assert!(error.contains("bad ops"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(outcomes[0].fps(), None);
    assert!(outcomes[1].fps().is_some_and(|fps| fps > 0.0));

    let json = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(json[0]["status"], "failed");
    assert_eq!(json[1]["status"], "completed");
    assert_eq!(json[1]["valid_samples"], 2);
}
