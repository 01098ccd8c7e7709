//! Expression dependency graph
//!
//! The graph is reconstructed from a flat, unordered record batch. Records
//! reference each other only through string expression keys: a record's
//! `result` key may appear in other records' `arguments`, and nothing in the
//! input marks which keys are "interior" and which are free inputs.
//!
//! Three indices are derived in one linear pass:
//!
//! 1. `expressions`: result key → producing record (insertion-ordered, so
//!    root enumeration follows first-production order)
//! 2. `arguments`: result key → set of its direct operand keys
//! 3. `dependents`: operand key → set of result keys that consume it
//!
//! The indices are a pure function of the record sequence and are rebuilt
//! from scratch on every new batch; there is no incremental update path.
//!
//! Keys that appear only as arguments have no `expressions` entry. They are
//! *unresolved leaves*: the renderer shows them as argument text on their
//! consumer but never expands them into nodes.

pub mod filter;
pub mod tree;

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use exprov_model::ProvenanceRecord;

pub use filter::filter_roots;
pub use tree::{render_forest, render_tree, ExpressionTree, VisitScope};

/// Derived indices over one record batch.
#[derive(Debug, Clone, Default)]
pub struct ExpressionGraph {
    expressions: IndexMap<String, ProvenanceRecord>,
    arguments: HashMap<String, HashSet<String>>,
    dependents: HashMap<String, HashSet<String>>,
}

impl ExpressionGraph {
    /// Build the indices from a record batch.
    ///
    /// Total: empty input yields empty indices, malformed records yield
    /// rendering gaps, never a failure. Runs in O(total arguments).
    pub fn build(records: &[ProvenanceRecord]) -> Self {
        let mut graph = Self::default();
        for record in records {
            graph.insert(record);
        }
        debug!(
            expressions = graph.expressions.len(),
            consumed_keys = graph.dependents.len(),
            "built expression graph"
        );
        graph
    }

    fn insert(&mut self, record: &ProvenanceRecord) {
        let result = record.result.clone();
        // Last write wins on duplicate result keys: the earlier record is
        // replaced entirely, including its argument edges, so `arguments`
        // always mirrors the winning record and `dependents` stays its exact
        // inverse. The key keeps its original position in the ordered map.
        if let Some(previous) = self.expressions.insert(result.clone(), record.clone()) {
            debug!(key = %result, "duplicate result key, keeping later record");
            for arg in &previous.arguments {
                if let Some(consumers) = self.dependents.get_mut(arg) {
                    consumers.remove(&result);
                    if consumers.is_empty() {
                        self.dependents.remove(arg);
                    }
                }
            }
            self.arguments.remove(&result);
        }
        for arg in &record.arguments {
            self.dependents
                .entry(arg.clone())
                .or_default()
                .insert(result.clone());
            self.arguments
                .entry(result.clone())
                .or_default()
                .insert(arg.clone());
        }
    }

    /// The record that produced `key`, when one exists in this batch.
    pub fn record(&self, key: &str) -> Option<&ProvenanceRecord> {
        self.expressions.get(key)
    }

    /// Whether `key` was produced by some record (i.e. is not an unresolved leaf).
    pub fn produces(&self, key: &str) -> bool {
        self.expressions.contains_key(key)
    }

    /// Direct operand set of a produced expression.
    pub fn arguments_of(&self, key: &str) -> Option<&HashSet<String>> {
        self.arguments.get(key)
    }

    /// Produced expressions that consume `key` as an argument.
    pub fn dependents_of(&self, key: &str) -> Option<&HashSet<String>> {
        self.dependents.get(key)
    }

    /// All produced expression keys, in first-production order.
    ///
    /// Every produced expression is a root: no attempt is made to demote
    /// expressions that are also consumed elsewhere.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.expressions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Iterate (key, record) pairs in first-production order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProvenanceRecord)> {
        self.expressions
            .iter()
            .map(|(key, record)| (key.as_str(), record))
    }
}
