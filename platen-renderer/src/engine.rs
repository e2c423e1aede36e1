//! Engine resolution.
//!
//! Precedence, strictly in order: an explicit engine name passed by the
//! caller, then an engine already carried on the view's context (set by a
//! previous pass), then a registered `noop` fallback, then none.

use platen_core::{EngineName, EngineRegistry, NOOP_ENGINE};

/// Resolve the engine for one file.
///
/// Pure and idempotent: resolving twice with the same inputs yields the same
/// result, so the same file can be piped through transforms repeatedly with
/// different explicit engines layered on top (multi-pass rendering).
pub fn resolve_engine(
    explicit: Option<&EngineName>,
    existing: Option<&EngineName>,
    engines: &EngineRegistry,
) -> Option<EngineName> {
    if let Some(name) = explicit {
        return Some(name.clone());
    }
    if let Some(name) = existing {
        return Some(name.clone());
    }
    if engines.has_noop() {
        return Some(EngineName::from(NOOP_ENGINE));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn name(s: &str) -> Option<EngineName> {
        Some(EngineName::from(s))
    }

    fn registry(with_noop: bool) -> EngineRegistry {
        let mut engines = EngineRegistry::new();
        if with_noop {
            engines.register_noop();
        }
        engines
    }

    #[rstest]
    #[case(name("hbs"), name("foo"), true, name("hbs"))] // explicit always wins
    #[case(name("hbs"), None, false, name("hbs"))]
    #[case(None, name("foo"), true, name("foo"))] // context engine kept
    #[case(None, None, true, name(NOOP_ENGINE))] // fallback
    #[case(None, None, false, None)] // nothing to resolve
    fn precedence(
        #[case] explicit: Option<EngineName>,
        #[case] existing: Option<EngineName>,
        #[case] with_noop: bool,
        #[case] expected: Option<EngineName>,
    ) {
        let engines = registry(with_noop);
        assert_eq!(
            resolve_engine(explicit.as_ref(), existing.as_ref(), &engines),
            expected
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let engines = registry(true);
        let first = resolve_engine(None, None, &engines);
        let second = resolve_engine(None, first.as_ref(), &engines);
        assert_eq!(first, second);
    }
}
