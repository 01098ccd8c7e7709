//! Exprov CLI
//!
//! Command-line viewer for expression provenance logs:
//! - `render` — rebuild the dependency graph and print the forest of
//!   expression trees (text, JSON, or Graphviz DOT)
//! - `roots` — list the (filtered) root expression keys
//! - `graph` — dump the derived indices as JSON
//!
//! Input is a file path, `-` for stdin, or nothing at all — supplying
//! nothing (or empty text) falls back to the built-in example dataset, and
//! invalid input falls back with a warning instead of failing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use exprov_graph::{render_forest, ExpressionGraph};

mod render;
mod session;

use render::{parse_visit_scope, forest_to_string, GraphDump, RenderFormat};
use session::{Session, SessionState};

#[derive(Parser)]
#[command(name = "exprov")]
#[command(author, version, about = "Exprov: expression provenance viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the provenance tree for each (filtered) root expression.
    Render {
        /// Input provenance log (`-` for stdin; omit to use the example dataset)
        input: Option<PathBuf>,
        /// Case-insensitive substring filter over root keys and method names
        #[arg(short, long)]
        search: Option<String>,
        /// Output format: text|json|dot
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Visited-set scope across roots: per-root|global
        #[arg(long, default_value = "per-root")]
        visit_scope: String,
    },
    /// List the (filtered) root expression keys.
    Roots {
        /// Input provenance log (`-` for stdin; omit to use the example dataset)
        input: Option<PathBuf>,
        /// Case-insensitive substring filter over root keys and method names
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Dump the derived graph indices as JSON.
    Graph {
        /// Input provenance log (`-` for stdin; omit to use the example dataset)
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            input,
            search,
            format,
            visit_scope,
        } => {
            let format = RenderFormat::parse(&format)?;
            let scope = parse_visit_scope(&visit_scope)?;
            let graph = load_graph(input)?;
            let roots = graph.search_roots(search.as_deref().unwrap_or(""));
            let forest = render_forest(roots, &graph, scope);
            print!("{}", forest_to_string(&forest, format)?);
        }
        Commands::Roots { input, search } => {
            let graph = load_graph(input)?;
            for root in graph.search_roots(search.as_deref().unwrap_or("")) {
                println!("{root}");
            }
        }
        Commands::Graph { input } => {
            let graph = load_graph(input)?;
            println!("{}", serde_json::to_string_pretty(&GraphDump::new(&graph))?);
        }
    }
    Ok(())
}

/// Read the input text, resolve the session, surface any fallback notice,
/// and build the graph.
fn load_graph(input: Option<PathBuf>) -> Result<ExpressionGraph> {
    let raw = read_input(input)?;
    let session = Session::load(raw.as_deref());
    tracing::debug!(records = session.records.len(), state = ?session.state, "session resolved");
    if let Some(notice) = &session.notice {
        eprintln!("{} {}", "warning:".yellow().bold(), notice);
    } else if session.state == SessionState::AwaitingInput && raw.is_some() {
        eprintln!(
            "{} empty input; using the built-in example dataset",
            "info:".yellow().bold()
        );
    }
    Ok(ExpressionGraph::build(&session.records))
}

fn read_input(input: Option<PathBuf>) -> Result<Option<String>> {
    match input {
        None => Ok(None),
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read provenance log from stdin")?;
            Ok(Some(text))
        }
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("read provenance log {}", path.display()))?;
            Ok(Some(text))
        }
    }
}
