//! Tree rendering over the expression graph.
//!
//! Rendering turns one produced expression into a tree of its provenance:
//! the node carries the record's display fields, children are the subset of
//! its arguments that are themselves produced expressions. Two guarantees
//! matter here:
//!
//! - **Termination.** Provenance logs are not trusted to be acyclic. A
//!   visited set shared across the whole descent of one root call stops any
//!   path from revisiting a key, so cycles degrade to a truncated branch
//!   instead of looping.
//! - **Bounded stack.** Traversal uses an explicit frame stack, not
//!   call-stack recursion, so a pathological deep chain cannot overflow.
//!
//! There is a deliberate asymmetry between text and expansion: a node's
//! `arguments` field always lists every operand key in declared order,
//! including unresolved leaves, while `children` only contains the operands
//! with a producing record. A free variable like `s1` therefore shows up in
//! its consumer's argument text but never as a node of its own.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ExpressionGraph;
use exprov_model::ProvenanceRecord;

/// One rendered node: the producing record's display fields plus the
/// resolved child subtrees.
///
/// Construction, [`depth`](Self::depth), and teardown are all iterative and
/// safe at arbitrary depth. The derived `Clone`, `PartialEq`, `Serialize`
/// and `Deserialize` impls recurse through `children` (and `Deserialize`
/// additionally hits serde_json's recursion limit), so they are only
/// suitable for trees of ordinary depth; depth-proof output goes through
/// the iterative emitters instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionTree {
    pub expression: String,
    pub method: String,
    /// Full operand list in declared order, unresolved leaves included.
    pub arguments: Vec<String>,
    pub user_top_stack: String,
    pub user_bottom_stack: String,
    pub floc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExpressionTree>,
}

impl ExpressionTree {
    fn leaf(expression: &str, record: &ProvenanceRecord) -> Self {
        Self {
            expression: expression.to_string(),
            method: record.method.clone(),
            arguments: record.arguments.clone(),
            user_top_stack: record.user_top_stack.clone(),
            user_bottom_stack: record.user_bottom_stack.clone(),
            floc: record.floc.clone(),
            children: Vec::new(),
        }
    }

    /// Longest node count on any root-to-leaf path.
    pub fn depth(&self) -> usize {
        // Explicit worklist for the same reason as rendering itself.
        let mut max = 0;
        let mut stack: Vec<(&ExpressionTree, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for child in &node.children {
                stack.push((child, depth + 1));
            }
        }
        max
    }
}

impl Drop for ExpressionTree {
    /// The compiler-generated drop glue recurses through `children`, which
    /// reintroduces the stack-depth limit the renderer avoids. Flatten each
    /// subtree into a worklist first so every node is childless by the time
    /// it is actually dropped.
    fn drop(&mut self) {
        let mut queue: Vec<ExpressionTree> = std::mem::take(&mut self.children);
        while let Some(mut node) = queue.pop() {
            queue.append(&mut node.children);
        }
    }
}

/// Visited-set scoping across the roots of one forest render.
///
/// A shared sub-expression is reachable from several roots. `PerRoot` gives
/// every root a fresh visited set, so the shared node renders fully under
/// each root that references it; `Global` shares one set across all roots,
/// suppressing a node everywhere after its first appearance. `PerRoot` is
/// the default: the alternative silently hides data under later roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitScope {
    #[default]
    PerRoot,
    Global,
}

/// Render one root expression as a tree.
///
/// Returns `None` when `root` is already in `visited` (cycle/re-visit guard)
/// or has no producing record (unresolved leaf). Keys are marked visited
/// before their children are expanded; the same set covers the whole
/// traversal of this call.
pub fn render_tree(
    root: &str,
    graph: &ExpressionGraph,
    visited: &mut HashSet<String>,
) -> Option<ExpressionTree> {
    if visited.contains(root) {
        return None;
    }
    let record = graph.record(root)?;
    visited.insert(root.to_string());

    struct Frame<'g> {
        node: ExpressionTree,
        // Children come from the record's ordered argument list, never from
        // the unordered argument index.
        pending: std::slice::Iter<'g, String>,
    }

    let mut stack = vec![Frame {
        node: ExpressionTree::leaf(root, record),
        pending: record.arguments.iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        match frame.pending.next() {
            Some(arg) => {
                if visited.contains(arg.as_str()) {
                    continue;
                }
                // Unresolved operands stay argument text only.
                let Some(child_record) = graph.record(arg) else {
                    continue;
                };
                visited.insert(arg.clone());
                stack.push(Frame {
                    node: ExpressionTree::leaf(arg, child_record),
                    pending: child_record.arguments.iter(),
                });
            }
            None => {
                let finished = stack.pop()?;
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(finished.node),
                    None => return Some(finished.node),
                }
            }
        }
    }
    // Unreachable: the loop only exits through the empty-parent arm above.
    None
}

/// Render an ordered root list into a forest.
///
/// Roots that resolve to `None` (unresolved, or suppressed under
/// [`VisitScope::Global`]) are dropped, not rendered as placeholders.
pub fn render_forest<'a>(
    roots: impl IntoIterator<Item = &'a str>,
    graph: &ExpressionGraph,
    scope: VisitScope,
) -> Vec<ExpressionTree> {
    let mut shared: HashSet<String> = HashSet::new();
    let mut forest = Vec::new();
    for root in roots {
        let mut fresh: HashSet<String> = HashSet::new();
        let visited = match scope {
            VisitScope::Global => &mut shared,
            VisitScope::PerRoot => &mut fresh,
        };
        if let Some(tree) = render_tree(root, graph, visited) {
            forest.push(tree);
        }
    }
    forest
}
