//! Adapter for serialized scripted modules (zip archives).

use std::path::Path;
use std::sync::Arc;

use crate::backends::native::{self, ModelFormat, NativeRuntime, RuntimeOptions};
use crate::backends::{Backend, BackendKind};
use crate::errors::LoadResult;
use crate::preprocess::{ImageFormat, PreprocessConfig, TensorLayout};
use crate::session::Session;

fn is_zip_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK\x03\x04")
}

const FORMAT: ModelFormat = ModelFormat {
    description: "scripted module archive",
    accepts: is_zip_archive,
};

/// Scripted modules always take channel-first RGB input.
pub struct ScriptedModuleBackend {
    runtime: Option<Arc<dyn NativeRuntime>>,
}

impl ScriptedModuleBackend {
    pub fn new() -> Self {
        Self { runtime: None }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn NativeRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl Default for ScriptedModuleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ScriptedModuleBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ScriptedModule
    }

    fn input_layout(&self) -> TensorLayout {
        TensorLayout::Nchw
    }

    fn preprocess_config(&self, base: &PreprocessConfig) -> PreprocessConfig {
        base.clone().with_dest(ImageFormat::Rgb)
    }

    fn load(&self, model_path: &Path, thread_count: usize) -> LoadResult<Session> {
        native::load_native(
            self.kind(),
            self.runtime.as_ref(),
            &FORMAT,
            model_path,
            RuntimeOptions {
                thread_count,
                layout: TensorLayout::Nchw,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forces_rgb_destination() {
        let base = PreprocessConfig::default().with_dest(ImageFormat::Bgr);
        let adjusted = ScriptedModuleBackend::new().preprocess_config(&base);
        assert_eq!(adjusted.dest, ImageFormat::Rgb);
        assert_eq!(adjusted.mean, base.mean);
    }
}
