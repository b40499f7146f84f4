//! Adapter for flatbuffer models run by a mobile interpreter.

use std::path::Path;
use std::sync::Arc;

use crate::backends::native::{self, ModelFormat, NativeRuntime, RuntimeOptions};
use crate::backends::{Backend, BackendKind};
use crate::errors::LoadResult;
use crate::preprocess::TensorLayout;
use crate::session::Session;

fn is_interpreter_model(bytes: &[u8]) -> bool {
    native::has_file_identifier(bytes, b"TFL3")
}

const FORMAT: ModelFormat = ModelFormat {
    description: "flatbuffer interpreter model",
    accepts: is_interpreter_model,
};

/// Interpreter models take channel-last inputs unless the model was exported
/// from a channel-first framework, in which case the layout can be switched.
/// Quantized models declare a `Uint8` input and receive rounded pixel values.
pub struct MobileInterpreterBackend {
    runtime: Option<Arc<dyn NativeRuntime>>,
    layout: TensorLayout,
}

impl MobileInterpreterBackend {
    pub fn new() -> Self {
        Self {
            runtime: None,
            layout: TensorLayout::Nhwc,
        }
    }

    /// Uses `runtime` instead of the process-wide environment.
    pub fn with_runtime(mut self, runtime: Arc<dyn NativeRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for MobileInterpreterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MobileInterpreterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::MobileInterpreter
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
