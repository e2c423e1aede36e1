//! Engine registry.
//!
//! Engines are named rendering functions registered on a host and selected by
//! explicit name, prior context, file extension, or the `noop` fallback.
//! Names are normalized so `"hbs"` and `".hbs"` address the same engine.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::EngineError;
use crate::types::{EngineName, RenderContext};

/// Name under which a fallback engine may be registered. When present, files
/// with no explicit or contextual engine resolve to it.
pub const NOOP_ENGINE: &str = "noop";

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// A named rendering function: transforms a view's content given a context.
pub trait Engine: Send + Sync {
    fn render(&self, content: &str, ctx: &RenderContext) -> Result<String, EngineError>;
}

impl<F> Engine for F
where
    F: Fn(&str, &RenderContext) -> Result<String, EngineError> + Send + Sync,
{
    fn render(&self, content: &str, ctx: &RenderContext) -> Result<String, EngineError> {
        self(content, ctx)
    }
}

/// Engine that returns its input unchanged. Register it under [`NOOP_ENGINE`]
/// to give engine resolution a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEngine;

impl Engine for NoopEngine {
    fn render(&self, content: &str, _ctx: &RenderContext) -> Result<String, EngineError> {
        Ok(content.to_owned())
    }
}

// ---------------------------------------------------------------------------
// EngineRegistry
// ---------------------------------------------------------------------------

/// Registry of engines keyed by normalized name.
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn Engine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized lookup key for an engine or extension name: leading dot
    /// stripped, lowercased.
    pub fn normalize(name: &str) -> String {
        name.trim_start_matches('.').to_ascii_lowercase()
    }

    /// Register `engine` under `name`. Re-registering a name replaces the
    /// previous engine.
    pub fn register<E>(&mut self, name: impl AsRef<str>, engine: E)
    where
        E: Engine + 'static,
    {
        self.engines
            .insert(Self::normalize(name.as_ref()), Arc::new(engine));
    }

    /// Register [`NoopEngine`] under [`NOOP_ENGINE`].
    pub fn register_noop(&mut self) {
        self.register(NOOP_ENGINE, NoopEngine);
    }

    pub fn get(&self, name: &EngineName) -> Option<Arc<dyn Engine>> {
        self.engines.get(&Self::normalize(&name.0)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(&Self::normalize(name))
    }

    /// Whether a fallback engine is registered.
    pub fn has_noop(&self) -> bool {
        self.contains(NOOP_ENGINE)
    }

    /// Engine whose name matches the extension of `path`, if any.
    pub fn match_path(&self, path: &Path) -> Option<EngineName> {
        let ext = path.extension()?.to_str()?;
        let key = Self::normalize(ext);
        self.engines
            .contains_key(&key)
            .then(|| EngineName(key))
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EngineRegistry")
            .field("engines", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenderContext;
    use rstest::rstest;

    fn upper(content: &str, _ctx: &RenderContext) -> Result<String, EngineError> {
        Ok(content.to_ascii_uppercase())
    }

    #[rstest]
    #[case("hbs", "hbs")]
    #[case(".hbs", "hbs")]
    #[case(".HBS", "hbs")]
    #[case("..noop", "noop")]
    fn normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(EngineRegistry::normalize(input), expected);
    }

    #[test]
    fn register_and_get_by_either_spelling() {
        let mut registry = EngineRegistry::new();
        registry.register(".hbs", upper);
        assert!(registry.contains("hbs"));
        assert!(registry.contains(".hbs"));
        let engine = registry.get(&EngineName::from(".HBS")).expect("engine");
        let out = engine.render("ab", &RenderContext::default()).expect("render");
        assert_eq!(out, "AB");
    }

    #[test]
    fn match_path_uses_the_extension() {
        let mut registry = EngineRegistry::new();
        registry.register("hbs", upper);
        assert_eq!(
            registry.match_path(Path::new("posts/a.hbs")),
            Some(EngineName::from("hbs"))
        );
        assert_eq!(registry.match_path(Path::new("posts/a.md")), None);
        assert_eq!(registry.match_path(Path::new("noext")), None);
    }

    #[test]
    fn noop_round_trips_content() {
        let mut registry = EngineRegistry::new();
        assert!(!registry.has_noop());
        registry.register_noop();
        assert!(registry.has_noop());
        let engine = registry.get(&EngineName::from(NOOP_ENGINE)).expect("noop");
        assert_eq!(
            engine.render("as-is", &RenderContext::default()).expect("render"),
            "as-is"
        );
    }

    #[test]
    fn reregistering_replaces_the_engine() {
        let mut registry = EngineRegistry::new();
        registry.register("x", upper);
        registry.register("x", NoopEngine);
        let engine = registry.get(&EngineName::from("x")).expect("engine");
        assert_eq!(engine.render("ab", &RenderContext::default()).expect("render"), "ab");
        assert_eq!(registry.len(), 1);
    }
}
