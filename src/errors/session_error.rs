//! Error types for backend loading and session usage.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::backends::BackendKind;

/// Why a backend could not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorReason {
    FileNotFound,
    CorruptModel,
    EngineInitFailed,
}

impl fmt::Display for LoadErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadErrorReason::FileNotFound => "model file not found",
            LoadErrorReason::CorruptModel => "corrupt model",
            LoadErrorReason::EngineInitFailed => "engine initialization failed",
        };
        f.write_str(label)
    }
}

/// Fatal error raised while loading a model into a backend.
#[derive(Error, Debug, Clone)]
#[error("{backend} backend failed to load '{}': {reason}: {message}", .path.display())]
pub struct LoadError {
    pub backend: BackendKind,
    pub reason: LoadErrorReason,
    pub path: PathBuf,
    pub message: String,
}

impl LoadError {
    pub fn new(
        backend: BackendKind,
        reason: LoadErrorReason,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            reason,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(backend: BackendKind, path: impl Into<PathBuf>) -> Self {
        Self::new(
            backend,
            LoadErrorReason::FileNotFound,
            path,
            "the path does not exist",
        )
    }
}

/// Errors raised by operations on a loaded [`crate::session::Session`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has been released and can no longer be used")]
    InvalidState,

    #[error("No {direction} tensor named {name:?}; available: {available:?}")]
    NotFound {
        direction: &'static str,
        name: Option<String>,
        available: Vec<String>,
    },

    /// Internal engine failure during a forward pass. The message is opaque to the harness.
    #[error("Forward pass failed: {message}")]
    Run { message: String },
}

impl SessionError {
    pub fn is_run_failure(&self) -> bool {
        matches!(self, SessionError::Run { .. })
    }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
pub type SessionResult<T> = std::result::Result<T, SessionError>;
