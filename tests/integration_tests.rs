//! Integration tests for the complete Exprov pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - raw text → Ingest → record batch
//! - record batch → Graph indices → rendered forest
//! - search → filtered root list → rendered forest
//!
//! Run with: cargo test --test integration_tests

use std::collections::HashSet;
use std::io::Write;

use exprov_graph::{render_forest, render_tree, ExpressionGraph, VisitScope};
use exprov_ingest::{parse_provenance, IngestError, ParsedInput};
use exprov_model::{example_records, ProvenanceRecord};

fn records_from(text: &str) -> Vec<ProvenanceRecord> {
    match parse_provenance(text).expect("parse") {
        ParsedInput::Records(records) => records,
        ParsedInput::Empty => Vec::new(),
    }
}

// ============================================================================
// Array input → graph → forest
// ============================================================================

#[test]
fn test_array_input_end_to_end() {
    let text = serde_json::to_string(&example_records()).expect("serialize example");
    let records = records_from(&text);
    assert_eq!(records.len(), 3);

    let graph = ExpressionGraph::build(&records);
    let roots = graph.search_roots("");
    assert_eq!(
        roots,
        vec!["(s1//2)", "1536*((s1//2))", "1536*((s1//2)) > 1536"]
    );

    let forest = render_forest(roots, &graph, VisitScope::PerRoot);
    assert_eq!(forest.len(), 3);
    let gt = forest.last().expect("gt tree");
    assert_eq!(gt.depth(), 3);
    assert_eq!(gt.children[0].children[0].expression, "(s1//2)");
}

#[test]
fn test_search_narrows_the_rendered_forest() {
    let graph = ExpressionGraph::build(&example_records());
    let roots = graph.search_roots("gt");
    assert_eq!(roots, vec!["1536*((s1//2)) > 1536"]);

    let forest = render_forest(roots, &graph, VisitScope::PerRoot);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].method, "gt");
}

// ============================================================================
// Line-delimited input
// ============================================================================

#[test]
fn test_line_delimited_end_to_end() {
    let mut text = String::new();
    for record in example_records() {
        text.push_str(&serde_json::to_string(&record).expect("serialize record"));
        text.push('\n');
    }
    // Inject a broken line; the rest of the batch must survive.
    text.push_str("{broken\n");

    let records = records_from(&text);
    assert_eq!(records.len(), 3);

    let graph = ExpressionGraph::build(&records);
    let mut visited = HashSet::new();
    let tree = render_tree("1536*((s1//2)) > 1536", &graph, &mut visited).expect("tree");
    assert_eq!(tree.depth(), 3);
}

#[test]
fn test_invalid_input_taxonomy() {
    // top-level object → Format, garbage → Parse, empty → Empty
    assert!(matches!(
        parse_provenance(r#"{"method": "add"}"#),
        Err(IngestError::Format)
    ));
    assert!(matches!(
        parse_provenance("][ not json"),
        Err(IngestError::Parse(_))
    ));
    assert!(matches!(parse_provenance("\n \n"), Ok(ParsedInput::Empty)));
}

// ============================================================================
// Degenerate graphs
// ============================================================================

#[test]
fn test_cyclic_input_renders_without_looping() {
    let text = r#"{"method": "f", "arguments": ["b"], "result": "a"}
{"method": "g", "arguments": ["a"], "result": "b"}"#;
    let graph = ExpressionGraph::build(&records_from(text));
    let forest = render_forest(graph.search_roots(""), &graph, VisitScope::PerRoot);
    assert_eq!(forest.len(), 2);
    for tree in &forest {
        assert_eq!(tree.depth(), 2);
    }
}

#[test]
fn test_duplicate_results_resolve_last_write_wins_end_to_end() {
    // Single line on purpose: a pretty-printed array would route through the
    // line-delimited branch and every line would be dropped.
    let text = r#"[{"method": "old", "arguments": ["a"], "result": "x"}, {"method": "new", "arguments": ["b"], "result": "x"}]"#;
    let graph = ExpressionGraph::build(&records_from(text));
    assert_eq!(graph.len(), 1);
    assert_eq!(graph.record("x").expect("x").method, "new");
    assert!(graph.dependents_of("a").is_none());
}

// ============================================================================
// File-shaped input (what the CLI feeds through the same pipeline)
// ============================================================================

#[test]
fn test_provenance_log_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("provenance.json");
    let mut file = std::fs::File::create(&path).expect("create log");
    write!(
        file,
        "{}",
        serde_json::to_string(&example_records()).expect("serialize")
    )
    .expect("write log");

    let text = std::fs::read_to_string(&path).expect("read log");
    let graph = ExpressionGraph::build(&records_from(&text));
    assert_eq!(graph.len(), 3);
    assert!(graph.produces("1536*((s1//2))"));
}
