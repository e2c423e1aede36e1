//! Error types for platen-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::EngineName;

/// Failure produced by a rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        EngineError { message: message.into() }
    }
}

impl From<String> for EngineError {
    fn from(message: String) -> Self {
        EngineError { message }
    }
}

impl From<&str> for EngineError {
    fn from(message: &str) -> Self {
        EngineError { message: message.to_owned() }
    }
}

/// All errors a host can surface to the render pipeline.
#[derive(Debug, Error)]
pub enum HostError {
    /// The context named an engine that is not registered.
    #[error("engine `{name}` is not registered")]
    EngineNotFound { name: EngineName },

    /// Strict mode: no engine on the context and no extension match.
    #[error("no engine resolved for {path}")]
    NoEngine { path: PathBuf },

    /// A registered engine failed while rendering.
    #[error("engine `{name}` failed: {source}")]
    Engine {
        name: EngineName,
        #[source]
        source: EngineError,
    },

    /// A middleware hook rejected the file.
    #[error("`{stage}` hook failed: {message}")]
    Hook { stage: String, message: String },
}
