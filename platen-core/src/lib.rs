//! Platen core library — pipeline file types, engine registry, options, errors.
//!
//! Public API surface:
//! - [`types`] — [`File`], [`View`], [`FileObject`], [`RenderContext`], newtypes
//! - [`registry`] — the [`Engine`] trait and [`EngineRegistry`]
//! - [`options`] — immutable [`Options`] composed from layered sources
//! - [`error`] — [`HostError`], [`EngineError`]

pub mod error;
pub mod options;
pub mod registry;
pub mod types;

pub use error::{EngineError, HostError};
pub use options::Options;
pub use registry::{Engine, EngineRegistry, NoopEngine, NOOP_ENGINE};
pub use types::{DataMap, EngineName, File, FileObject, RenderContext, View};
