//! deadgraph CLI - dead code detector over resolved program graphs.
//!
//! Features:
//! - Recursive discovery of resolved-program files
//! - Rayon-powered parallel analysis, one graph per program
//! - deadgraph.toml configuration
//! - Plain text and JSON reports
//! - Graphviz DOT and visualizer JSON export

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use deadgraph_core::{
    analyze_programs_parallel, gather_program_files, graph_to_visualizer_json,
    init_structured_logging, load_config, print_json, print_plain, AnalysisOptions,
    AnalysisResult, Containment, DeadgraphConfig, GraphError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Dead code detector over resolved program graphs")]
pub struct Cli {
    /// Program files or directories to scan for them
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Fully-qualified entry point (repeatable). Defaults to top-level `main` functions
    #[arg(long = "root", value_name = "NAME")]
    roots: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Generate Graphviz DOT output for each program graph
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a specified file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,

    /// Follow edges only; do not keep the containers of live declarations alive
    #[arg(long)]
    strict: bool,

    /// Regex pattern of dead declarations not to report (repeatable)
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Directory holding deadgraph.toml
    #[arg(long, value_name = "DIR", default_value = ".")]
    config: PathBuf,

    /// Export program graphs to JSON file (visualizer format)
    #[arg(long, value_name = "FILE")]
    export_graph: Option<String>,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p.components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Command-line flags first, config file values underneath.
fn build_options(cli: &Cli, config: Option<&DeadgraphConfig>) -> AnalysisOptions {
    let options = AnalysisOptions {
        roots: cli.roots.clone(),
        containment: cli.strict.then_some(Containment::Strict),
        ignore: cli.ignore.clone(),
    };
    match config {
        Some(cfg) => options.merge_config(cfg),
        None => options,
    }
}

/// Writes `content` to a validated output path.
fn write_output(file: &str, content: &str, what: &str) -> Result<()> {
    let safe_path = validate_output_path(file).context("Invalid output path")?;
    fs::write(&safe_path, content)
        .with_context(|| format!("{} write failed to {}", what, safe_path.display()))?;
    eprintln!("{} saved to: {}", what, safe_path.display());
    Ok(())
}

/// Errors confined to one input (a malformed program or config file).
fn is_skippable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<GraphError>()
        .is_some_and(GraphError::is_recoverable)
}

fn gather_all(paths: &[PathBuf]) -> Vec<PathBuf> {
    let gathered: Vec<_> = paths.par_iter().map(|p| gather_program_files(p)).collect();
    let mut files = Vec::new();
    for outcome in gathered {
        match outcome {
            Ok(found) => files.extend(found),
            Err(e) => eprintln!("[WARN] {:#}", e),
        }
    }
    files.sort();
    files.dedup();
    files
}

#[cfg(feature = "dot")]
fn emit_dot(cli: &Cli, results: &[AnalysisResult]) -> Result<()> {
    if !cli.dot && cli.dot_file.is_none() {
        return Ok(());
    }
    let dot = results
        .iter()
        .map(|r| deadgraph_core::generate_dot(&r.graph))
        .collect::<Vec<_>>()
        .join("\n");
    match cli.dot_file {
        Some(ref file) => write_output(file, &dot, "DOT graph"),
        None => {
            println!("{}", dot);
            Ok(())
        }
    }
}

#[cfg(not(feature = "dot"))]
fn emit_dot(cli: &Cli, _results: &[AnalysisResult]) -> Result<()> {
    if cli.dot || cli.dot_file.is_some() {
        eprintln!("[WARN] built without the `dot` feature, DOT output skipped");
    }
    Ok(())
}

fn export_graphs(results: &[AnalysisResult]) -> serde_json::Value {
    serde_json::Value::Array(
        results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "program": r.name,
                    "graph": graph_to_visualizer_json(&r.graph),
                })
            })
            .collect(),
    )
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadgraph internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Load config (an invalid file is skipped, an unreadable one is fatal)
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) if is_skippable(&e) => {
            eprintln!("[WARN] config ignored: {:#}", e);
            None
        }
        Err(e) => {
            eprintln!("[ERROR] config load failed: {:#}", e);
            std::process::exit(2);
        }
    };
    let options = build_options(&cli, config.as_ref());
    let json = cli.json || config.as_ref().is_some_and(DeadgraphConfig::wants_json);

    // 2. Discover program files
    let files = gather_all(&cli.paths);
    if files.is_empty() {
        eprintln!("[WARN] no program files found");
        return Ok(());
    }

    // 3. Analyze every program independently
    let mut results = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    for (path, outcome) in analyze_programs_parallel(&files, &options) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) if is_skippable(&e) => {
                eprintln!("[WARN] skipping {}: {:#}", path.display(), e);
            }
            Err(e) => {
                failed += 1;
                eprintln!("[ERROR] {}: {:#}", path.display(), e);
            }
        }
    }

    // 4. Report
    let reports: Vec<_> = results.iter().map(AnalysisResult::report).collect();
    if json {
        print_json(&reports);
    } else {
        for report in &reports {
            print_plain(report);
        }
    }

    // 5. DOT/Graphviz output
    if let Err(e) = emit_dot(&cli, &results) {
        failed += 1;
        eprintln!("[ERROR] {:#}", e);
    }

    // 6. Visualizer export
    if let Some(ref file) = cli.export_graph {
        let document = serde_json::to_string_pretty(&export_graphs(&results))?;
        if let Err(e) = write_output(file, &document, "Graph export") {
            failed += 1;
            eprintln!("[ERROR] {:#}", e);
        }
    }

    // 7. Exit code (CI-friendly)
    let dead_found = results.iter().any(AnalysisResult::has_dead_code);
    std::process::exit(exit_code(dead_found, failed));
}

fn exit_code(dead_found: bool, failed: usize) -> i32 {
    if failed > 0 {
        2
    } else if dead_found {
        1
    } else {
        0
    }
}
