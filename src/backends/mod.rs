//! Backend adapters.
//!
//! Every engine is driven through the [`Backend`] trait: it declares the input
//! layout it expects, adjusts the shared preprocessing configuration for its own
//! quirks and loads a model file into a [`Session`]. The custom engine runs in
//! this crate; the other three delegate to a [`NativeRuntime`] installed by the
//! embedding application.

mod custom_engine;
mod graph_runtime;
mod mobile_interpreter;
pub mod native;
mod scripted_module;

use std::fmt;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::LoadResult;
use crate::preprocess::{PreprocessConfig, TensorLayout};
use crate::session::Session;

pub use custom_engine::CustomEngineBackend;
pub use graph_runtime::GraphRuntimeBackend;
pub use mobile_interpreter::MobileInterpreterBackend;
pub use native::{NativeModel, NativeRuntime, RuntimeOptions, install_runtime, installed_runtime};
pub use scripted_module::ScriptedModuleBackend;

/// The engines the harness knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    CustomEngine,
    MobileInterpreter,
    GraphRuntime,
    ScriptedModule,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::CustomEngine,
        BackendKind::MobileInterpreter,
        BackendKind::GraphRuntime,
        BackendKind::ScriptedModule,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::CustomEngine => "custom_engine",
            BackendKind::MobileInterpreter => "mobile_interpreter",
            BackendKind::GraphRuntime => "graph_runtime",
            BackendKind::ScriptedModule => "scripted_module",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common interface over all inference engines.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Layout the model expects for its image input.
    fn input_layout(&self) -> TensorLayout;

    /// Applies backend-specific adjustments on top of the user configuration.
    fn preprocess_config(&self, base: &PreprocessConfig) -> PreprocessConfig {
        base.clone()
    }

    /// Loads a model file and prepares a session using `thread_count` engine threads.
    fn load(&self, model_path: &Path, thread_count: usize) -> LoadResult<Session>;
}

/// Builds the adapter for `kind`, resolving native runtimes from the process-wide
/// environment at load time.
pub fn create_backend(kind: BackendKind, layout: Option<TensorLayout>) -> Box<dyn Backend> {
    match kind {
        BackendKind::CustomEngine => {
            if layout.is_some_and(|l| l != TensorLayout::Nchw) {
                warn!("{kind} only supports nchw inputs, ignoring layout override");
            }
            Box::new(CustomEngineBackend::new())
        }
        BackendKind::MobileInterpreter => {
            let backend = MobileInterpreterBackend::new();
            Box::new(match layout {
                Some(layout) => backend.with_layout(layout),
                None => backend,
            })
        }
        BackendKind::GraphRuntime => {
            let backend = GraphRuntimeBackend::new();
            Box::new(match layout {
                Some(layout) => backend.with_layout(layout),
                None => backend,
            })
        }
        BackendKind::ScriptedModule => {
            if layout.is_some_and(|l| l != TensorLayout::Nchw) {
                warn!("{kind} only supports nchw inputs, ignoring layout override");
            }
            Box::new(ScriptedModuleBackend::new())
        }
    }
}
