//! Error types for platen-renderer.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use platen_core::HostError;

/// Snapshot of a transform's batch bookkeeping, attached to render failures
/// for diagnostics. Never used for control decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSnapshot {
    /// Every file that entered the transform so far, in arrival order.
    pub files: Vec<PathBuf>,
    /// The subset that completed the load phase, in completion order.
    pub loaded: Vec<PathBuf>,
    /// The most recently seen file.
    pub last: Option<PathBuf>,
}

/// Per-file failure emitted on a transform's output stream.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The `onLoad` hook rejected the file. Carries no batch snapshot: the
    /// hook runs before batch enrichment applies.
    #[error("`onLoad` failed for {path}: {source}")]
    Hook {
        path: PathBuf,
        #[source]
        source: HostError,
    },

    /// The render delegate returned an error.
    #[error("rendering failed for {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: HostError,
        batch: BatchSnapshot,
    },

    /// The render delegate completed without an error or a result.
    #[error("rendering produced no output for {path}")]
    NoOutput { path: PathBuf, batch: BatchSnapshot },
}

impl RenderError {
    /// Path of the file this failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            RenderError::Hook { path, .. }
            | RenderError::Render { path, .. }
            | RenderError::NoOutput { path, .. } => path,
        }
    }

    /// Batch snapshot, for the failure classes that carry one.
    pub fn batch(&self) -> Option<&BatchSnapshot> {
        match self {
            RenderError::Hook { .. } => None,
            RenderError::Render { batch, .. } | RenderError::NoOutput { batch, .. } => Some(batch),
        }
    }
}
