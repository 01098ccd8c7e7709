//! Output formats for the rendered forest.
//!
//! Formats:
//! - plain text (indented forest, default; mirrors what the original viewer
//!   showed per node)
//! - JSON (the serialized tree forest, for custom frontends)
//! - Graphviz DOT (dependency edges, external layout tooling)

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use exprov_graph::{ExpressionGraph, ExpressionTree, VisitScope};
use exprov_model::ProvenanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Json,
    Dot,
}

impl RenderFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            other => Err(anyhow!(
                "unknown render format `{other}` (expected text|json|dot)"
            )),
        }
    }
}

pub fn parse_visit_scope(s: &str) -> Result<VisitScope> {
    match s.trim().to_ascii_lowercase().as_str() {
        "per-root" | "per_root" | "root" => Ok(VisitScope::PerRoot),
        "global" => Ok(VisitScope::Global),
        other => Err(anyhow!(
            "unknown visit scope `{other}` (expected per-root|global)"
        )),
    }
}

pub fn forest_to_string(forest: &[ExpressionTree], format: RenderFormat) -> Result<String> {
    match format {
        RenderFormat::Text => Ok(forest_to_text(forest)),
        RenderFormat::Json => forest_to_json(forest),
        RenderFormat::Dot => Ok(forest_to_dot(forest)),
    }
}

/// JSON forest, emitted through an explicit stack.
///
/// The derived `Serialize` on the tree type recurses through `children`, so
/// serde_json would overflow on the same deep-chain inputs the renderer is
/// built to survive. The output is byte-identical to what the derive
/// produces (same field order, `children` omitted when empty), just written
/// iteratively and compact.
fn forest_to_json(forest: &[ExpressionTree]) -> Result<String> {
    let mut out = String::from("[");
    for (idx, tree) in forest.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write_tree_json(&mut out, tree)?;
    }
    out.push(']');
    Ok(out)
}

fn write_tree_json(out: &mut String, tree: &ExpressionTree) -> Result<()> {
    // (node, index of the next child to emit); fields are written on the
    // first visit, the node is closed once every child has been emitted.
    let mut stack: Vec<(&ExpressionTree, usize)> = vec![(tree, 0)];
    while let Some((node, next)) = stack.last_mut() {
        let node = *node;
        let idx = *next;
        if idx == 0 {
            write_node_fields(out, node)?;
            if !node.children.is_empty() {
                out.push_str(",\"children\":[");
            }
        }
        if idx < node.children.len() {
            if idx > 0 {
                out.push(',');
            }
            *next = idx + 1;
            stack.push((&node.children[idx], 0));
            continue;
        }
        if node.children.is_empty() {
            out.push('}');
        } else {
            out.push_str("]}");
        }
        stack.pop();
    }
    Ok(())
}

fn write_node_fields(out: &mut String, node: &ExpressionTree) -> Result<()> {
    out.push_str("{\"expression\":");
    out.push_str(&json_string(&node.expression)?);
    out.push_str(",\"method\":");
    out.push_str(&json_string(&node.method)?);
    out.push_str(",\"arguments\":[");
    for (idx, arg) in node.arguments.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&json_string(arg)?);
    }
    out.push_str("],\"user_top_stack\":");
    out.push_str(&json_string(&node.user_top_stack)?);
    out.push_str(",\"user_bottom_stack\":");
    out.push_str(&json_string(&node.user_bottom_stack)?);
    out.push_str(",\"floc\":");
    out.push_str(&json_string(&node.floc)?);
    Ok(())
}

fn json_string(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

/// Indented textual forest.
///
/// Iterative walk: tree depth is only bounded by the input, so the emitter
/// must not recurse any more than the renderer does.
fn forest_to_text(forest: &[ExpressionTree]) -> String {
    let mut out = String::new();
    for tree in forest {
        let mut stack: Vec<(&ExpressionTree, usize)> = vec![(tree, 0)];
        while let Some((node, depth)) = stack.pop() {
            let pad = "  ".repeat(depth);
            let _ = writeln!(out, "{pad}{}", node.expression);
            let _ = writeln!(out, "{pad}  method: {}", node.method);
            let _ = writeln!(out, "{pad}  arguments: {}", node.arguments.join(", "));
            if !node.user_top_stack.is_empty() {
                let _ = writeln!(out, "{pad}  user entry: {}", node.user_top_stack);
            }
            if !node.user_bottom_stack.is_empty() {
                let _ = writeln!(out, "{pad}  user exit: {}", node.user_bottom_stack);
            }
            if !node.floc.is_empty() {
                let _ = writeln!(out, "{pad}  framework: {}", node.floc);
            }
            // Reverse so children emit in declared argument order.
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out.push('\n');
    }
    out
}

/// Graphviz digraph of the rendered dependency edges (parent → child).
fn forest_to_dot(forest: &[ExpressionTree]) -> String {
    let mut out = String::from("digraph provenance {\n  rankdir=TB;\n  node [shape=box];\n");
    for tree in forest {
        let mut stack: Vec<&ExpressionTree> = vec![tree];
        while let Some(node) = stack.pop() {
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\\n{}\"];",
                dot_escape(&node.expression),
                dot_escape(&node.expression),
                dot_escape(&node.method)
            );
            for child in &node.children {
                let _ = writeln!(
                    out,
                    "  \"{}\" -> \"{}\";",
                    dot_escape(&node.expression),
                    dot_escape(&child.expression)
                );
                stack.push(child);
            }
        }
    }
    out.push_str("}\n");
    out
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Serializable dump of the three derived indices (debug aid).
///
/// Sets become sorted vectors so the dump is byte-stable across runs.
#[derive(Debug, Serialize)]
pub struct GraphDump {
    pub expressions: BTreeMap<String, ProvenanceRecord>,
    pub arguments: BTreeMap<String, Vec<String>>,
    pub dependents: BTreeMap<String, Vec<String>>,
}

impl GraphDump {
    pub fn new(graph: &ExpressionGraph) -> Self {
        let mut expressions = BTreeMap::new();
        let mut arguments = BTreeMap::new();
        let mut dependents = BTreeMap::new();
        for (key, record) in graph.iter() {
            expressions.insert(key.to_string(), record.clone());
            if let Some(args) = graph.arguments_of(key) {
                let mut args: Vec<String> = args.iter().cloned().collect();
                args.sort();
                arguments.insert(key.to_string(), args);
            }
            for arg in &record.arguments {
                if let Some(consumers) = graph.dependents_of(arg) {
                    let mut consumers: Vec<String> = consumers.iter().cloned().collect();
                    consumers.sort();
                    dependents.insert(arg.to_string(), consumers);
                }
            }
        }
        Self {
            expressions,
            arguments,
            dependents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprov_graph::render_forest;
    use exprov_model::example_records;

    fn example_forest() -> (ExpressionGraph, Vec<ExpressionTree>) {
        let graph = ExpressionGraph::build(&example_records());
        let roots: Vec<&str> = graph.roots().collect();
        let forest = render_forest(roots, &graph, VisitScope::PerRoot);
        (graph, forest)
    }

    #[test]
    fn format_parsing() {
        assert_eq!(RenderFormat::parse("text").expect("text"), RenderFormat::Text);
        assert_eq!(RenderFormat::parse(" JSON ").expect("json"), RenderFormat::Json);
        assert_eq!(RenderFormat::parse("dot").expect("dot"), RenderFormat::Dot);
        assert!(RenderFormat::parse("html").is_err());
        assert!(parse_visit_scope("per-root").is_ok());
        assert!(parse_visit_scope("global").is_ok());
        assert!(parse_visit_scope("everywhere").is_err());
    }

    #[test]
    fn text_output_indents_children_and_lists_all_arguments() {
        let (_graph, forest) = example_forest();
        let text = forest_to_text(&forest);
        assert!(text.contains("1536*((s1//2)) > 1536\n"));
        assert!(text.contains("  method: gt"));
        // unresolved operands stay visible in the argument line
        assert!(text.contains("arguments: s1, 2"));
        // the floordiv node under the gt root sits two levels deep
        assert!(text.contains("    (s1//2)\n"));
    }

    #[test]
    fn json_output_matches_the_derived_serializer_on_shallow_forests() {
        let (_graph, forest) = example_forest();
        let emitted = forest_to_json(&forest).expect("emit json");
        let derived = serde_json::to_string(&forest).expect("derive json");
        assert_eq!(emitted, derived);
    }

    #[test]
    fn json_output_survives_pathological_depth() {
        let n = 11_000;
        let mut records = Vec::with_capacity(n);
        records.push(ProvenanceRecord {
            method: "seed".to_string(),
            arguments: vec!["input".to_string()],
            result: "e0".to_string(),
            ..Default::default()
        });
        for i in 1..n {
            records.push(ProvenanceRecord {
                method: "step".to_string(),
                arguments: vec![format!("e{}", i - 1)],
                result: format!("e{i}"),
                ..Default::default()
            });
        }
        let graph = ExpressionGraph::build(&records);
        let deepest = format!("e{}", n - 1);
        let forest = render_forest([deepest.as_str()], &graph, VisitScope::PerRoot);

        let json = forest_to_json(&forest).expect("emit json");
        assert!(json.starts_with(&format!("[{{\"expression\":\"{deepest}\"")));
        assert!(json.contains("\"expression\":\"e0\""));
        assert!(json.ends_with("}]"));
    }

    #[test]
    fn dot_output_quotes_keys_and_emits_edges() {
        let (_graph, forest) = example_forest();
        let dot = forest_to_dot(&forest);
        assert!(dot.starts_with("digraph provenance {"));
        assert!(dot.contains("\"1536*((s1//2)) > 1536\" -> \"1536*((s1//2))\";"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn graph_dump_is_sorted_and_complete() {
        let (graph, _forest) = example_forest();
        let dump = GraphDump::new(&graph);
        assert_eq!(dump.expressions.len(), 3);
        assert_eq!(
            dump.dependents.get("(s1//2)"),
            Some(&vec!["1536*((s1//2))".to_string()])
        );
        let json = serde_json::to_string(&dump).expect("serialize dump");
        assert!(json.contains("floordiv"));
    }
}
