//! Root search.
//!
//! Search is an extension layer over the graph, not part of its semantics:
//! it narrows the ordered root list before rendering and does nothing else.
//! Matching is a case-insensitive substring test on the raw key text, which
//! is what operators paste from tracebacks; no tokenization is warranted at
//! this scale.

/// Filter root keys by a case-insensitive substring of the key text.
///
/// Only the empty term is special-cased: it returns every key unchanged. Any
/// other term, whitespace included, is matched literally. Relative order of
/// the input is preserved either way, so feeding
/// [`crate::ExpressionGraph::roots`] through here keeps first-production
/// order.
pub fn filter_roots<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    term: &str,
) -> Vec<&'a str> {
    if term.is_empty() {
        return keys.into_iter().collect();
    }
    let term = term.to_lowercase();
    keys.into_iter()
        .filter(|key| key.to_lowercase().contains(&term))
        .collect()
}

impl crate::ExpressionGraph {
    /// Search the root list by key text *or* producing method name.
    ///
    /// Key-only matching cannot find an operation by name when the result
    /// expression spells it symbolically (the `gt` record's result is
    /// `... > 1536`), so the viewer-facing search also consults
    /// `record.method`. Order and case-insensitivity follow
    /// [`filter_roots`].
    pub fn search_roots(&self, term: &str) -> Vec<&str> {
        if term.is_empty() {
            return self.roots().collect();
        }
        let term = term.to_lowercase();
        self.iter()
            .filter(|(key, record)| {
                key.to_lowercase().contains(&term)
                    || record.method.to_lowercase().contains(&term)
            })
            .map(|(key, _)| key)
            .collect()
    }
}
