//! Render orchestration — the streaming `render_file` transform.
//!
//! Per file: null contents are forwarded untouched; raw files are promoted to
//! views; the host's `onLoad` hook runs once; a context is built and attached
//! together with the resolved engine; then the host render delegate runs, or
//! the view passes through when no engine resolved and strict mode is off.
//! Failures drop the file and surface an error, but never stop or reorder the
//! surviving files.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::stream::{Stream, StreamExt};
use serde_json::Value;

use platen_core::{EngineName, FileObject, Options};

use crate::context::{build_context, Locals};
use crate::engine::resolve_engine;
use crate::error::{BatchSnapshot, RenderError};
use crate::host::Host;

/// Marker under which the plugin registers itself on a host.
pub const PLUGIN_NAME: &str = "render-file";

// ---------------------------------------------------------------------------
// Plugin installation
// ---------------------------------------------------------------------------

/// Factory for the render-file capability, parameterized by an optional
/// config layer merged over the host's base options.
#[derive(Debug, Clone, Default)]
pub struct RenderFilePlugin {
    config: platen_core::DataMap,
}

impl RenderFilePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: platen_core::DataMap) -> Self {
        RenderFilePlugin { config }
    }

    /// Install into `host`, composing the plugin's base options once.
    ///
    /// Returns `None` when the capability is already installed on this host
    /// (idempotent registration).
    pub fn install<H>(&self, host: Arc<H>) -> Option<RenderFile<H>>
    where
        H: Host + 'static,
    {
        if !host.register_plugin(PLUGIN_NAME) {
            return None;
        }
        let options = host.options().compose(&[&self.config]);
        Some(RenderFile { host, options })
    }
}

/// The installed render-file capability, bound to one host.
pub struct RenderFile<H: Host> {
    host: Arc<H>,
    options: Options,
}

/// Arguments to [`RenderFile::transform`] — the `renderFile(engine?, locals?)`
/// overloads made explicit.
#[derive(Debug, Clone, Default)]
pub struct RenderParams {
    /// Explicit engine, applied to every file and overriding any engine
    /// already on a view's context.
    pub engine: Option<EngineName>,
    pub locals: Locals,
}

impl RenderParams {
    pub fn engine(name: impl Into<EngineName>) -> Self {
        RenderParams { engine: Some(name.into()), ..Self::default() }
    }

    pub fn locals(locals: impl Into<Locals>) -> Self {
        RenderParams { engine: None, locals: locals.into() }
    }

    pub fn engine_with_locals(name: impl Into<EngineName>, locals: impl Into<Locals>) -> Self {
        RenderParams { engine: Some(name.into()), locals: locals.into() }
    }
}

impl<H: Host + 'static> RenderFile<H> {
    /// Build one streaming transform instance.
    ///
    /// Literal locals are merged into the transform's options as the last
    /// layer; a collection reference is not.
    pub fn transform(&self, params: RenderParams) -> FileTransform<H> {
        tracing::debug!(engine = ?params.engine, "render_file transform");
        let options = match params.locals.as_data() {
            Some(map) => self.options.compose(&[map]),
            None => self.options.clone(),
        };
        FileTransform {
            host: Arc::clone(&self.host),
            options: Arc::new(options),
            engine: params.engine,
            locals: Arc::new(params.locals),
        }
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// One streaming transform instance with its own batch bookkeeping.
pub struct FileTransform<H: Host> {
    host: Arc<H>,
    options: Arc<Options>,
    engine: Option<EngineName>,
    locals: Arc<Locals>,
}

/// Files seen and files loaded by one transform, in order. Snapshotted into
/// render failures only.
#[derive(Debug, Default)]
struct BatchState {
    seen: Vec<PathBuf>,
    loaded: Vec<PathBuf>,
}

impl BatchState {
    fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            files: self.seen.clone(),
            loaded: self.loaded.clone(),
            last: self.seen.last().cloned(),
        }
    }
}

// Poison-tolerant lock: a panic mid-append leaves the vectors usable.
fn lock(state: &Mutex<BatchState>) -> MutexGuard<'_, BatchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<H: Host + 'static> FileTransform<H> {
    /// Apply the transform to a stream of file objects.
    ///
    /// Up to `Options::concurrency` per-file chains run at once; `buffered`
    /// preserves arrival order on output. Failed files become `Err` items in
    /// place; survivors keep their relative order.
    pub fn apply<S>(self, input: S) -> impl Stream<Item = Result<FileObject, RenderError>>
    where
        S: Stream<Item = FileObject>,
    {
        let FileTransform { host, options, engine, locals } = self;
        let state = Arc::new(Mutex::new(BatchState::default()));
        let concurrency = options.concurrency.max(1);

        input
            .map(move |file| {
                // Arrival order: recorded synchronously, before any await.
                lock(&state).seen.push(file.path().to_path_buf());
                process_one(
                    Arc::clone(&host),
                    Arc::clone(&options),
                    engine.clone(),
                    Arc::clone(&locals),
                    Arc::clone(&state),
                    file,
                )
            })
            .buffered(concurrency)
    }
}

/// Drive one file through the state machine:
/// `received → promoted → loaded → engine-resolved →
/// rendered | passed-through | failed`.
async fn process_one<H: Host>(
    host: Arc<H>,
    options: Arc<Options>,
    explicit: Option<EngineName>,
    locals: Arc<Locals>,
    state: Arc<Mutex<BatchState>>,
    file: FileObject,
) -> Result<FileObject, RenderError> {
    if file.is_null() {
        tracing::debug!(path = %file.path().display(), "null contents, forwarding unchanged");
        return Ok(file);
    }

    let view = file.into_view();
    let path = view.path.clone();

    // onLoad middleware, at most once per file. Hook failures carry no batch
    // snapshot and bypass the host error channel.
    let mut view = match host.handle_on_load(view).await {
        Ok(view) => view,
        Err(source) => return Err(RenderError::Hook { path, source }),
    };
    lock(&state).loaded.push(path.clone());
    tracing::debug!(path = %path.display(), "pre-render");

    let mut ctx = build_context(host.data(), &locals, &view.data);
    // The per-file engine is one carried over from a previous pass, else one
    // matching the file's extension.
    let existing = view
        .context_engine()
        .cloned()
        .or_else(|| host.engines().match_path(&view.path));
    ctx.engine = resolve_engine(explicit.as_ref(), existing.as_ref(), host.engines());
    // Expose the view's identity to engines, without clobbering caller data.
    ctx.data
        .entry("key")
        .or_insert_with(|| Value::String(view.key()));
    // Attached before the render call so the context is never re-merged.
    view.attach_context(ctx.clone());

    if ctx.engine.is_none() && !options.engine_strict {
        tracing::debug!(path = %path.display(), "no engine resolved, passing through");
        return Ok(FileObject::View(view));
    }

    match host.render_view(view, &ctx).await {
        Ok(Some(rendered)) => {
            tracing::debug!(path = %rendered.path.display(), "post-render");
            Ok(FileObject::View(rendered))
        }
        Ok(None) => {
            let err = RenderError::NoOutput { path, batch: lock(&state).snapshot() };
            host.emit_error(&err);
            Err(err)
        }
        Err(source) => {
            let err = RenderError::Render { path, source, batch: lock(&state).snapshot() };
            host.emit_error(&err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::App;

    #[test]
    fn second_install_is_a_no_op() {
        let app = Arc::new(App::new());
        let plugin = RenderFilePlugin::new();
        assert!(plugin.install(Arc::clone(&app)).is_some());
        assert!(plugin.install(app).is_none());
    }

    #[test]
    fn install_composes_plugin_config_over_host_options() {
        let mut config = platen_core::DataMap::new();
        config.insert("engine_strict".to_owned(), serde_json::json!(true));
        let app = Arc::new(App::new());
        let rf = RenderFilePlugin::with_config(config)
            .install(app)
            .expect("first install");
        assert!(rf.options.engine_strict);
    }
}
