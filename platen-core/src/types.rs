//! Domain types for in-flight pipeline files.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! File data, locals and contexts are `serde_json` maps so engines can consume
//! them without a fixed schema.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object map used for file data, locals and rendering contexts.
pub type DataMap = Map<String, Value>;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a registered rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineName(pub String);

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EngineName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EngineName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A raw in-flight file: one artifact moving through the pipeline.
///
/// Created upstream, owned by the render orchestrator for the duration of one
/// transform step, then handed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub path: PathBuf,
    /// `None` marks a file with no payload at all, distinct from `Some("")`.
    /// Null-content files are forwarded through transforms unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    /// Arbitrary per-file data, merged highest-precedence into the context.
    #[serde(default)]
    pub data: DataMap,
}

impl File {
    /// A file with string contents and no data.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        File {
            path: path.into(),
            contents: Some(contents.into()),
            data: DataMap::new(),
        }
    }

    /// A file with the null-content marker.
    pub fn null(path: impl Into<PathBuf>) -> Self {
        File {
            path: path.into(),
            contents: None,
            data: DataMap::new(),
        }
    }

    /// Attach a data entry, returning the file for chaining.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// `true` when the file carries no payload at all.
    pub fn is_null(&self) -> bool {
        self.contents.is_none()
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// A file promoted to a render-aware view.
///
/// Carries the per-file render context once attached, and remembers which hook
/// stages already ran so `handle_once` semantics survive multi-pass piping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(default)]
    pub data: DataMap,
    /// Context attached before rendering; carried across passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RenderContext>,
    #[serde(default)]
    handled: HashSet<String>,
}

impl View {
    /// A view with string contents and no data.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        View {
            path: path.into(),
            contents: Some(contents.into()),
            data: DataMap::new(),
            context: None,
            handled: HashSet::new(),
        }
    }

    /// Identity key for this view: the file stem, falling back to the full path.
    pub fn key(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// `true` when the view carries no payload at all.
    pub fn is_null(&self) -> bool {
        self.contents.is_none()
    }

    /// Whether the named hook stage already ran for this file.
    pub fn handled(&self, stage: &str) -> bool {
        self.handled.contains(stage)
    }

    /// Record that the named hook stage ran.
    pub fn mark_handled(&mut self, stage: impl Into<String>) {
        self.handled.insert(stage.into());
    }

    /// Attach the rendering context. Must happen before the render call so the
    /// context is never re-merged downstream.
    pub fn attach_context(&mut self, ctx: RenderContext) {
        self.context = Some(ctx);
    }

    /// Engine carried on a previously-attached context, if any.
    pub fn context_engine(&self) -> Option<&EngineName> {
        self.context.as_ref().and_then(|c| c.engine.as_ref())
    }
}

impl From<File> for View {
    /// Promotion preserves path, contents and data.
    fn from(file: File) -> Self {
        View {
            path: file.path,
            contents: file.contents,
            data: file.data,
            context: None,
            handled: HashSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileObject
// ---------------------------------------------------------------------------

/// Tagged pipeline item: either a raw file or a promoted view.
///
/// This is the stream item type on both sides of a transform, so rendered
/// views can be re-piped through further transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileObject {
    Raw(File),
    View(View),
}

impl FileObject {
    pub fn is_view(&self) -> bool {
        matches!(self, FileObject::View(_))
    }

    pub fn is_null(&self) -> bool {
        match self {
            FileObject::Raw(f) => f.is_null(),
            FileObject::View(v) => v.is_null(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileObject::Raw(f) => &f.path,
            FileObject::View(v) => &v.path,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        match self {
            FileObject::Raw(f) => f.contents.as_deref(),
            FileObject::View(v) => v.contents.as_deref(),
        }
    }

    pub fn data(&self) -> &DataMap {
        match self {
            FileObject::Raw(f) => &f.data,
            FileObject::View(v) => &v.data,
        }
    }

    /// Promote to a view, or unwrap one that already is.
    pub fn into_view(self) -> View {
        match self {
            FileObject::Raw(f) => View::from(f),
            FileObject::View(v) => v,
        }
    }
}

impl From<File> for FileObject {
    fn from(file: File) -> Self {
        FileObject::Raw(file)
    }
}

impl From<View> for FileObject {
    fn from(view: View) -> Self {
        FileObject::View(view)
    }
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// Per-file rendering context: a flat data map plus the resolved engine.
///
/// Built fresh per file, deep-copied from its sources, discarded after the
/// render call completes. Never shared across files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    #[serde(default)]
    pub data: DataMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineName>,
}

impl RenderContext {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_marker_is_distinct_from_empty_string() {
        assert!(File::null("a.hbs").is_null());
        assert!(!File::new("a.hbs", "").is_null());
    }

    #[test]
    fn promotion_preserves_path_contents_and_data() {
        let file = File::new("posts/a.hbs", "hello").with_data("title", json!("a"));
        let view = View::from(file.clone());
        assert_eq!(view.path, file.path);
        assert_eq!(view.contents, file.contents);
        assert_eq!(view.data, file.data);
        assert!(view.context.is_none());
    }

    #[test]
    fn view_key_is_the_file_stem() {
        assert_eq!(View::new("posts/a.hbs", "").key(), "a");
        assert_eq!(View::new("b", "").key(), "b");
    }

    #[test]
    fn into_view_does_not_reset_an_existing_view() {
        let mut view = View::new("a.hbs", "x");
        view.mark_handled("onLoad");
        let obj = FileObject::from(view);
        assert!(obj.is_view());
        assert!(obj.into_view().handled("onLoad"));
    }

    #[test]
    fn handled_stages_start_empty_and_stick() {
        let mut view = View::new("a.hbs", "x");
        assert!(!view.handled("onLoad"));
        view.mark_handled("onLoad");
        view.mark_handled("onLoad");
        assert!(view.handled("onLoad"));
    }

    #[test]
    fn context_engine_reads_through_attached_context() {
        let mut view = View::new("a.hbs", "x");
        assert!(view.context_engine().is_none());
        view.attach_context(RenderContext {
            data: DataMap::new(),
            engine: Some(EngineName::from("foo")),
        });
        assert_eq!(view.context_engine(), Some(&EngineName::from("foo")));
    }
}
