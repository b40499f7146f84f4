//! A loaded model plus its execution context.
//!
//! A [`Session`] owns the engine handle and the named input and output tensors
//! exchanged with it. It is usable between a successful backend load and an
//! explicit [`Session::release`]; every operation after that fails with
//! [`SessionError::InvalidState`]. Dropping an unreleased session frees the
//! handle without reporting anything.

use log::debug;

use crate::backends::BackendKind;
use crate::errors::{SessionError, SessionResult, TensorResult};
use crate::tensor::{DataType, Tensor};

/// Name, shape and element type of one model input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: DataType,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype,
        }
    }
}

/// A tensor bound to a model input or output name.
#[derive(Debug, Clone)]
pub struct NamedTensor {
    pub name: String,
    pub tensor: Tensor,
}

/// Engine-side state of a loaded model.
///
/// Implementations read the session's input tensors and write its output
/// tensors. Errors are opaque messages; the session wraps them in
/// [`SessionError::Run`].
pub trait ModelHandle: Send {
    fn run(&mut self, inputs: &[NamedTensor], outputs: &mut [NamedTensor]) -> Result<(), String>;
}

pub struct Session {
    kind: BackendKind,
    handle: Option<Box<dyn ModelHandle>>,
    inputs: Vec<NamedTensor>,
    outputs: Vec<NamedTensor>,
    thread_count: usize,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.kind)
            .field("inputs", &self.input_names())
            .field("outputs", &self.output_names())
            .field("thread_count", &self.thread_count)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Session {
    /// Builds a session around a loaded handle, allocating zero-filled tensors
    /// for every declared input and output.
    pub fn new(
        kind: BackendKind,
        handle: Box<dyn ModelHandle>,
        inputs: &[TensorSpec],
        outputs: &[TensorSpec],
        thread_count: usize,
    ) -> TensorResult<Self> {
        Ok(Self {
            kind,
            handle: Some(handle),
            inputs: Self::allocate(inputs)?,
            outputs: Self::allocate(outputs)?,
            thread_count,
        })
    }

    fn allocate(specs: &[TensorSpec]) -> TensorResult<Vec<NamedTensor>> {
        specs
            .iter()
            .map(|spec| {
                Ok(NamedTensor {
                    name: spec.name.clone(),
                    tensor: Tensor::new(&spec.shape, spec.dtype)?,
                })
            })
            .collect()
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|t| t.name.as_str()).collect()
    }

    fn ensure_live(&self) -> SessionResult<()> {
        if self.is_released() {
            return Err(SessionError::InvalidState);
        }
        Ok(())
    }

    /// Resolves a tensor by name. `None` selects the only tensor and fails when
    /// there is more than one.
    fn position(
        tensors: &[NamedTensor],
        direction: &'static str,
        name: Option<&str>,
    ) -> SessionResult<usize> {
        let found = match name {
            Some(name) => tensors.iter().position(|t| t.name == name),
            None if tensors.len() == 1 => Some(0),
            None => None,
        };
        found.ok_or_else(|| SessionError::NotFound {
            direction,
            name: name.map(str::to_string),
            available: tensors.iter().map(|t| t.name.clone()).collect(),
        })
    }

    pub fn input(&self, name: Option<&str>) -> SessionResult<&Tensor> {
        self.ensure_live()?;
        let index = Self::position(&self.inputs, "input", name)?;
        Ok(&self.inputs[index].tensor)
    }

    pub fn input_mut(&mut self, name: Option<&str>) -> SessionResult<&mut Tensor> {
        self.ensure_live()?;
        let index = Self::position(&self.inputs, "input", name)?;
        Ok(&mut self.inputs[index].tensor)
    }

    pub fn output(&self, name: Option<&str>) -> SessionResult<&Tensor> {
        self.ensure_live()?;
        let index = Self::position(&self.outputs, "output", name)?;
        Ok(&self.outputs[index].tensor)
    }

    pub fn output_mut(&mut self, name: Option<&str>) -> SessionResult<&mut Tensor> {
        self.ensure_live()?;
        let index = Self::position(&self.outputs, "output", name)?;
        Ok(&mut self.outputs[index].tensor)
    }

    /// Executes one synchronous forward pass over the current input tensors.
    pub fn run(&mut self) -> SessionResult<()> {
        let handle = self.handle.as_mut().ok_or(SessionError::InvalidState)?;
        handle
            .run(&self.inputs, &mut self.outputs)
            .map_err(|message| SessionError::Run { message })
    }

    /// Frees the engine handle. The session is unusable afterwards.
    pub fn release(&mut self) -> SessionResult<()> {
        let handle = self.handle.take().ok_or(SessionError::InvalidState)?;
        drop(handle);
        debug!("Released {} session", self.kind);
        Ok(())
    }
}
