//! Context construction.
//!
//! The rendering context for a file is a right-biased overwrite merge of
//! global data → caller locals → the file's own data, with the resolved
//! engine attached afterwards. The result is deep-copied from its sources:
//! mutating a file later never corrupts another file's already-built context.

use platen_core::{DataMap, RenderContext};

/// Caller-supplied locals: literal data merged into every context, or a
/// collection reference.
///
/// A collection reference contributes nothing to the context merge and
/// suppresses re-merging options from the locals argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Locals {
    Data(DataMap),
    Collection(CollectionRef),
}

/// Marker naming a collection passed in place of literal locals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub name: String,
}

impl Default for Locals {
    fn default() -> Self {
        Locals::Data(DataMap::new())
    }
}

impl Locals {
    pub fn data(map: DataMap) -> Self {
        Locals::Data(map)
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Locals::Collection(CollectionRef { name: name.into() })
    }

    /// Literal locals, or `None` for a collection reference.
    pub fn as_data(&self) -> Option<&DataMap> {
        match self {
            Locals::Data(map) => Some(map),
            Locals::Collection(_) => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Locals::Collection(_))
    }
}

impl From<DataMap> for Locals {
    fn from(map: DataMap) -> Self {
        Locals::Data(map)
    }
}

/// Build the per-file rendering context. The engine slot is left unset;
/// resolution happens separately.
pub fn build_context(global: &DataMap, locals: &Locals, file_data: &DataMap) -> RenderContext {
    let mut data = DataMap::new();
    merge_into(&mut data, global);
    if let Some(map) = locals.as_data() {
        merge_into(&mut data, map);
    }
    merge_into(&mut data, file_data);
    RenderContext { data, engine: None }
}

fn merge_into(target: &mut DataMap, source: &DataMap) {
    for (key, value) in source.iter() {
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), json!(v)))
            .collect()
    }

    #[test]
    fn file_data_wins_over_locals_over_global() {
        let global = map(&[("title", "g"), ("site", "s")]);
        let locals = Locals::data(map(&[("title", "l"), ("page", "p")]));
        let file_data = map(&[("title", "f")]);
        let ctx = build_context(&global, &locals, &file_data);
        assert_eq!(ctx.get_str("title"), Some("f"));
        assert_eq!(ctx.get_str("site"), Some("s"));
        assert_eq!(ctx.get_str("page"), Some("p"));
        assert!(ctx.engine.is_none());
    }

    #[test]
    fn collection_reference_contributes_nothing() {
        let global = map(&[("title", "g")]);
        let locals = Locals::collection("pages");
        let ctx = build_context(&global, &locals, &DataMap::new());
        assert_eq!(ctx.get_str("title"), Some("g"));
        assert_eq!(ctx.data.len(), 1);
        assert!(locals.is_collection());
    }

    #[test]
    fn context_is_independent_of_its_sources() {
        let mut file_data = map(&[("title", "a")]);
        let ctx = build_context(&DataMap::new(), &Locals::default(), &file_data);
        file_data.insert("title".to_owned(), json!("mutated"));
        assert_eq!(ctx.get_str("title"), Some("a"));
    }
}
