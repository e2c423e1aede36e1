//! Immutable transform options.
//!
//! An [`Options`] value is composed once per transform instantiation from the
//! host's base options, the plugin's config argument, and call-time locals,
//! in that order — later layers win on key collision. It is never mutated
//! after composition.

use serde_json::Value;

use crate::types::DataMap;

/// Layer key controlling strict-mode engine resolution.
const ENGINE_STRICT: &str = "engine_strict";
/// Layer key controlling how many per-file render chains run at once.
const CONCURRENCY: &str = "concurrency";

/// Default number of per-file render chains in flight per transform.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Read-only configuration for one transform instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// When `false` (the default), a file with no resolvable engine passes
    /// through unrendered. When `true`, the render delegate is invoked anyway
    /// and reports the missing engine as a failure.
    pub engine_strict: bool,
    /// Maximum per-file render chains in flight at once; output order is
    /// preserved regardless.
    pub concurrency: usize,
    /// Unrecognized keys from every layer, kept for engines and hooks that
    /// read them.
    pub extra: DataMap,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            engine_strict: false,
            concurrency: DEFAULT_CONCURRENCY,
            extra: DataMap::new(),
        }
    }
}

impl Options {
    /// Compose a new value from `self` plus `layers`, right-biased: later
    /// layers win on key collision. Pure; `self` is unchanged.
    pub fn compose(&self, layers: &[&DataMap]) -> Options {
        let mut out = self.clone();
        for layer in layers {
            for (key, value) in layer.iter() {
                match key.as_str() {
                    ENGINE_STRICT => {
                        if let Some(strict) = value.as_bool() {
                            out.engine_strict = strict;
                        }
                    }
                    CONCURRENCY => {
                        if let Some(n) = value.as_u64() {
                            out.concurrency = (n as usize).max(1);
                        }
                    }
                    _ => {
                        out.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        out
    }

    /// Extra option value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(pairs: &[(&str, Value)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn defaults_are_relaxed() {
        let opts = Options::default();
        assert!(!opts.engine_strict);
        assert_eq!(opts.concurrency, DEFAULT_CONCURRENCY);
        assert!(opts.extra.is_empty());
    }

    #[test]
    fn later_layers_win() {
        let base = Options::default();
        let config = layer(&[("layout", json!("default")), ("engine_strict", json!(true))]);
        let locals = layer(&[("layout", json!("post"))]);
        let opts = base.compose(&[&config, &locals]);
        assert!(opts.engine_strict);
        assert_eq!(opts.get("layout"), Some(&json!("post")));
    }

    #[test]
    fn compose_does_not_mutate_the_base() {
        let base = Options::default();
        let config = layer(&[("engine_strict", json!(true))]);
        let _ = base.compose(&[&config]);
        assert!(!base.engine_strict);
    }

    #[test]
    fn concurrency_is_clamped_to_at_least_one() {
        let opts = Options::default().compose(&[&layer(&[("concurrency", json!(0))])]);
        assert_eq!(opts.concurrency, 1);
    }

    #[test]
    fn non_bool_strict_value_is_ignored() {
        let opts = Options::default().compose(&[&layer(&[("engine_strict", json!("yes"))])]);
        assert!(!opts.engine_strict);
    }
}
