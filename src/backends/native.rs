//! Boundary to engines that live outside this crate.
//!
//! Native engines keep one process-wide environment per backend kind. The
//! environment is installed at most once, by whoever gets there first, and is
//! never torn down while the process runs.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::{debug, info};

use crate::backends::BackendKind;
use crate::errors::{LoadError, LoadErrorReason, LoadResult};
use crate::preprocess::TensorLayout;
use crate::session::{ModelHandle, Session, TensorSpec};

/// Options passed to a native runtime when a model is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub thread_count: usize,
    pub layout: TensorLayout,
}

/// A model loaded by a native runtime.
pub struct NativeModel {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
    pub handle: Box<dyn ModelHandle>,
}

/// An engine environment able to turn model bytes into an executable handle.
pub trait NativeRuntime: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self, model: &[u8], options: &RuntimeOptions) -> Result<NativeModel, String>;
}

type RuntimeSlot = OnceLock<Arc<dyn NativeRuntime>>;

static MOBILE_INTERPRETER_ENV: RuntimeSlot = OnceLock::new();
static GRAPH_RUNTIME_ENV: RuntimeSlot = OnceLock::new();
static SCRIPTED_MODULE_ENV: RuntimeSlot = OnceLock::new();

fn environment(kind: BackendKind) -> Option<&'static RuntimeSlot> {
    match kind {
        BackendKind::CustomEngine => None,
        BackendKind::MobileInterpreter => Some(&MOBILE_INTERPRETER_ENV),
        BackendKind::GraphRuntime => Some(&GRAPH_RUNTIME_ENV),
        BackendKind::ScriptedModule => Some(&SCRIPTED_MODULE_ENV),
    }
}

/// Installs the process-wide runtime for a native backend kind.
///
/// Returns `false` when a runtime is already installed (the first one stays) or
/// when `kind` is not a native backend.
pub fn install_runtime(kind: BackendKind, runtime: Arc<dyn NativeRuntime>) -> bool {
    let Some(slot) = environment(kind) else {
        return false;
    };
    let name = runtime.name().to_string();
    let installed = slot.set(runtime).is_ok();
    if installed {
        info!("Installed {name} as the {kind} environment");
    } else {
        debug!("{kind} environment already installed, ignoring {name}");
    }
    installed
}

/// The runtime installed for `kind`, if any.
pub fn installed_runtime(kind: BackendKind) -> Option<Arc<dyn NativeRuntime>> {
    environment(kind).and_then(|slot| slot.get().cloned())
}

/// Reads a model file, mapping a missing path to `FileNotFound` and any other
/// read failure to `CorruptModel`.
pub(crate) fn read_model_file(kind: BackendKind, path: &Path) -> LoadResult<Vec<u8>> {
    if !path.exists() {
        return Err(LoadError::file_not_found(kind, path));
    }
    std::fs::read(path).map_err(|e| {
        let reason = if e.kind() == std::io::ErrorKind::NotFound {
            LoadErrorReason::FileNotFound
        } else {
            LoadErrorReason::CorruptModel
        };
        LoadError::new(kind, reason, path, e.to_string())
    })
}

pub(crate) fn check_thread_count(kind: BackendKind, path: &Path, thread_count: usize) -> LoadResult<()> {
    if thread_count == 0 {
        return Err(LoadError::new(
            kind,
            LoadErrorReason::EngineInitFailed,
            path,
            "thread count must be at least 1",
        ));
    }
    Ok(())
}

/// Container check applied to model bytes before they reach a runtime.
pub(crate) struct ModelFormat {
    pub description: &'static str,
    pub accepts: fn(&[u8]) -> bool,
}

/// Shared load path of the native adapters.
pub(crate) fn load_native(
    kind: BackendKind,
    runtime: Option<&Arc<dyn NativeRuntime>>,
    format: &ModelFormat,
    model_path: &Path,
    options: RuntimeOptions,
) -> LoadResult<Session> {
    check_thread_count(kind, model_path, options.thread_count)?;
    let bytes = read_model_file(kind, model_path)?;
    if !(format.accepts)(&bytes) {
        return Err(LoadError::new(
            kind,
            LoadErrorReason::CorruptModel,
            model_path,
            format!("not a {} file", format.description),
        ));
    }

    let runtime = match runtime {
        Some(runtime) => Arc::clone(runtime),
        None => installed_runtime(kind).ok_or_else(|| {
            LoadError::new(
                kind,
                LoadErrorReason::EngineInitFailed,
                model_path,
                "no runtime installed for this backend",
            )
        })?,
    };

    let init_failed =
        |message: String| LoadError::new(kind, LoadErrorReason::EngineInitFailed, model_path, message);
    let model = runtime.load(&bytes, &options).map_err(init_failed)?;
    if model.inputs.is_empty() || model.outputs.is_empty() {
        return Err(init_failed(format!(
            "{} reported {} inputs and {} outputs",
            runtime.name(),
            model.inputs.len(),
            model.outputs.len()
        )));
    }

    let session = Session::new(
        kind,
        model.handle,
        &model.inputs,
        &model.outputs,
        options.thread_count,
    )
    .map_err(|e| init_failed(e.to_string()))?;
    info!(
        "Loaded {} ({} bytes) with {} using {} threads",
        model_path.display(),
        bytes.len(),
        runtime.name(),
        options.thread_count
    );
    Ok(session)
}

/// True when `bytes` carries the 4-byte `identifier` at offset 4, as flatbuffer
/// files do.
pub(crate) fn has_file_identifier(bytes: &[u8], identifier: &[u8; 4]) -> bool {
    bytes.get(4..8) == Some(identifier.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_identifier() {
        assert!(has_file_identifier(b"\x1c\0\0\0TFL3rest", b"TFL3"));
        assert!(!has_file_identifier(b"\x1c\0\0\0TFL", b"TFL3"));
        assert!(!has_file_identifier(b"", b"ORTM"));
    }

    #[test]
    fn test_custom_engine_has_no_environment() {
        assert!(installed_runtime(BackendKind::CustomEngine).is_none());
    }
}
