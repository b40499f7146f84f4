//! Adapter for the in-crate engine.

use std::path::Path;

use log::{debug, info};

use crate::backends::native::{check_thread_count, read_model_file};
use crate::backends::{Backend, BackendKind};
use crate::engine::{EngineGraph, EngineGraphInfo};
use crate::errors::{LoadError, LoadErrorReason, LoadResult};
use crate::preprocess::TensorLayout;
use crate::session::{ModelHandle, NamedTensor, Session, TensorSpec};
use crate::tensor::DataType;

/// Runs JSON graph models on the built-in engine. Inputs are channel-first floats.
#[derive(Debug, Default)]
pub struct CustomEngineBackend;

impl CustomEngineBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Owns the graph and the computation buffer reused across runs.
struct CustomEngineHandle {
    graph: EngineGraph,
    buffer: Vec<f32>,
}

impl ModelHandle for CustomEngineHandle {
    fn run(&mut self, inputs: &[NamedTensor], outputs: &mut [NamedTensor]) -> Result<(), String> {
        let input = inputs[0].tensor.as_f32().map_err(|e| e.to_string())?;
        let result = self
            .graph
            .predict_with_buffer(input, &mut self.buffer)
            .map_err(|e| e.to_string())?;
        outputs[0]
            .tensor
            .set_data(result)
            .map_err(|e| e.to_string())
    }
}

impl Backend for CustomEngineBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::CustomEngine
    }

    fn input_layout(&self) -> TensorLayout {
        TensorLayout::Nchw
    }

    fn load(&self, model_path: &Path, thread_count: usize) -> LoadResult<Session> {
        let kind = self.kind();
        check_thread_count(kind, model_path, thread_count)?;
        let bytes = read_model_file(kind, model_path)?;

        let info: EngineGraphInfo = serde_json::from_slice(&bytes).map_err(|e| {
            LoadError::new(kind, LoadErrorReason::CorruptModel, model_path, e.to_string())
        })?;
        let init_failed =
            |message: String| LoadError::new(kind, LoadErrorReason::EngineInitFailed, model_path, message);
        let graph = EngineGraph::new(info).map_err(|e| init_failed(e.to_string()))?;

        if thread_count > 1 {
            debug!("{kind} executes on one thread, ignoring thread count {thread_count}");
        }

        let inputs = [TensorSpec::new(
            graph.input_name(),
            graph.input_shape().to_vec(),
            DataType::Float32,
        )];
        let outputs = [TensorSpec::new(
            graph.output_name(),
            vec![1, graph.output_size()],
            DataType::Float32,
        )];
        let buffer = vec![0.0f32; graph.required_memory()];
        info!(
            "Loaded {} with input {:?} and {} output values",
            model_path.display(),
            graph.input_shape(),
            graph.output_size()
        );

        Session::new(
            kind,
            Box::new(CustomEngineHandle { graph, buffer }),
            &inputs,
            &outputs,
            thread_count,
        )
        .map_err(|e| init_failed(e.to_string()))
    }
}
