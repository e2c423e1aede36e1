//! The host seam and the reference [`App`] implementation.
//!
//! A [`Host`] is what the render pipeline is installed into: it owns the base
//! options, the engine registry, global data, the `onLoad` middleware hook,
//! and the generic error channel. The pipeline only ever talks to this trait,
//! so tests (and embedders) can substitute their own host.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::BoxFuture;

use platen_core::{DataMap, EngineRegistry, HostError, Options, RenderContext, View};

use crate::error::RenderError;

/// Stage name for the pre-render load hook.
pub const ON_LOAD: &str = "onLoad";

/// Middleware hook invoked at most once per file before rendering. Owns the
/// view for the duration of the call and returns it, possibly mutated.
pub type OnLoadHook =
    Arc<dyn Fn(View) -> BoxFuture<'static, Result<View, HostError>> + Send + Sync>;

type ErrorListener = Box<dyn Fn(&RenderError) + Send + Sync>;

// ---------------------------------------------------------------------------
// Host trait
// ---------------------------------------------------------------------------

/// Contract the render pipeline consumes from its embedding application.
#[async_trait]
pub trait Host: Send + Sync {
    /// Base options merged lowest-precedence into every transform's options.
    fn options(&self) -> &Options;

    /// Registered engines.
    fn engines(&self) -> &EngineRegistry;

    /// Global data merged lowest-precedence into every rendering context.
    fn data(&self) -> &DataMap;

    /// Run the `onLoad` hook for `view`, at most once per file; a second call
    /// for the same file returns it unchanged.
    async fn handle_on_load(&self, view: View) -> Result<View, HostError>;

    /// Render `view` with `ctx`. `Ok(None)` is a silent failure: the delegate
    /// completed without an error but produced nothing.
    async fn render_view(
        &self,
        view: View,
        ctx: &RenderContext,
    ) -> Result<Option<View>, HostError>;

    /// Generic error-notification channel.
    fn emit_error(&self, err: &RenderError);

    /// Idempotent-registration guard: marks `name` installed and returns
    /// `true`, or returns `false` if it already was.
    fn register_plugin(&self, name: &str) -> bool;
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Reference [`Host`]: options, engines, global data, an optional async
/// `onLoad` hook, error listeners, and the installed-plugin marker set.
#[derive(Default)]
pub struct App {
    options: Options,
    engines: EngineRegistry,
    data: DataMap,
    on_load: Option<OnLoadHook>,
    error_listeners: Vec<ErrorListener>,
    plugins: Mutex<HashSet<String>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        App { options, ..Self::default() }
    }

    pub fn engines_mut(&mut self) -> &mut EngineRegistry {
        &mut self.engines
    }

    pub fn data_mut(&mut self) -> &mut DataMap {
        &mut self.data
    }

    /// Insert one global data entry.
    pub fn set_data(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Install the `onLoad` middleware hook.
    pub fn on_load<F, Fut>(&mut self, hook: F)
    where
        F: Fn(View) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<View, HostError>> + Send + 'static,
    {
        let wrapped: OnLoadHook = Arc::new(move |view| Box::pin(hook(view)));
        self.on_load = Some(wrapped);
    }

    /// Subscribe to the error channel.
    pub fn on_error<F>(&mut self, listener: F)
    where
        F: Fn(&RenderError) + Send + Sync + 'static,
    {
        self.error_listeners.push(Box::new(listener));
    }
}

#[async_trait]
impl Host for App {
    fn options(&self) -> &Options {
        &self.options
    }

    fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    fn data(&self) -> &DataMap {
        &self.data
    }

    async fn handle_on_load(&self, view: View) -> Result<View, HostError> {
        if view.handled(ON_LOAD) {
            return Ok(view);
        }
        let mut view = match &self.on_load {
            Some(hook) => hook.as_ref()(view).await?,
            None => view,
        };
        view.mark_handled(ON_LOAD);
        Ok(view)
    }

    async fn render_view(
        &self,
        view: View,
        ctx: &RenderContext,
    ) -> Result<Option<View>, HostError> {
        let mut view = view;
        // Engine from the context, else matched from the file extension.
        let name = match &ctx.engine {
            Some(name) => name.clone(),
            None => self
                .engines
                .match_path(&view.path)
                .ok_or_else(|| HostError::NoEngine { path: view.path.clone() })?,
        };
        let engine = self
            .engines
            .get(&name)
            .ok_or_else(|| HostError::EngineNotFound { name: name.clone() })?;
        let input = view.contents.clone().unwrap_or_default();
        let output = engine
            .render(&input, ctx)
            .map_err(|source| HostError::Engine { name, source })?;
        view.contents = Some(output);
        Ok(Some(view))
    }

    fn emit_error(&self, err: &RenderError) {
        tracing::error!(path = %err.path().display(), error = %err, "render error");
        for listener in &self.error_listeners {
            listener(err);
        }
    }

    fn register_plugin(&self, name: &str) -> bool {
        let mut plugins = self
            .plugins
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        plugins.insert(name.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
