//! Adapter for graph runtime models (protobuf or optimized flatbuffer).

use std::path::Path;
use std::sync::Arc;

use crate::backends::native::{self, ModelFormat, NativeRuntime, RuntimeOptions};
use crate::backends::{Backend, BackendKind};
use crate::errors::LoadResult;
use crate::preprocess::TensorLayout;
use crate::session::Session;

/// Protobuf models start with the `ir_version` varint field (tag 0x08).
/// Optimized models are flatbuffers identified by `ORTM`.
fn is_graph_model(bytes: &[u8]) -> bool {
    bytes.first() == Some(&0x08) || native::has_file_identifier(bytes, b"ORTM")
}

const FORMAT: ModelFormat = ModelFormat {
    description: "graph runtime model",
    accepts: is_graph_model,
};

pub struct GraphRuntimeBackend {
    runtime: Option<Arc<dyn NativeRuntime>>,
    layout: TensorLayout,
}

impl GraphRuntimeBackend {
    pub fn new() -> Self {
        Self {
            runtime: None,
            layout: TensorLayout::Nchw,
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn NativeRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for GraphRuntimeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for GraphRuntimeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::GraphRuntime
    }

    fn input_layout(&self) -> TensorLayout {
        self.layout
    }

    fn load(&self, model_path: &Path, thread_count: usize) -> LoadResult<Session> {
        native::load_native(
            self.kind(),
            self.runtime.as_ref(),
            &FORMAT,
            model_path,
            RuntimeOptions {
                thread_count,
                layout: self.layout,
            },
        )
    }
}
