//! Fluent API for running a whole analysis pass:
//!
//! ```rust,ignore
//! use deadgraph_core::prelude::*;
//!
//! let program = load_program(Path::new("program.json"))?;
//! let result = Analysis::new(&program)
//!     .roots(["myapp.main"])
//!     .containment(Containment::LiveContainers)
//!     .ignore_patterns(["\\.generated\\."])
//!     .run()?;
//!
//! for dead in &result.dead {
//!     println!("Dead: {} {}", dead.kind, dead.name);
//! }
//! ```
//!
//! Each pass builds and owns its own [`Graph`]; independent programs can be
//! analyzed in parallel with [`analyze_programs_parallel`].

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::builder::build_graph;
use crate::config::{compile_patterns, DeadgraphConfig};
use crate::detect::{find_dead_filtered, DeadDeclaration};
use crate::graph::{Graph, GraphStats};
use crate::node::NodeKind;
use crate::program::{load_program, ResolvedProgram};
use crate::reachability::{compute_reachability_with, Containment, ReachabilitySummary};
use crate::report::DeadCodeReport;

/// Name of the function used as entry point when no roots are configured.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Settings shared by every program of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Fully-qualified entry-point names. Empty means top-level `main`
    /// functions.
    pub roots: Vec<String>,
    /// `None` means not chosen: config, then the default mode, applies.
    pub containment: Option<Containment>,
    /// Regex patterns of dead declarations not to report.
    pub ignore: Vec<String>,
}

impl AnalysisOptions {
    /// Merge config file values; values already set here take precedence.
    pub fn merge_config(mut self, config: &DeadgraphConfig) -> Self {
        if self.roots.is_empty() {
            if let Some(roots) = &config.entry_points {
                self.roots = roots.clone();
            }
        }
        if let Some(ignore) = &config.ignore {
            self.ignore.extend(ignore.iter().cloned());
        }
        if self.containment.is_none() {
            self.containment = config.containment;
        }
        self
    }
}

/// Builder for one analysis pass over one program.
#[derive(Debug)]
pub struct Analysis<'p, P: ResolvedProgram + ?Sized> {
    program: &'p P,
    name: String,
    options: AnalysisOptions,
}

/// Everything a pass produced.
#[derive(Debug)]
pub struct AnalysisResult {
    pub name: String,
    pub graph: Graph,
    pub summary: ReachabilitySummary,
    pub dead: Vec<DeadDeclaration>,
    pub stats: GraphStats,
}

impl AnalysisResult {
    pub fn has_dead_code(&self) -> bool {
        !self.dead.is_empty()
    }

    pub fn report(&self) -> DeadCodeReport {
        DeadCodeReport {
            program: self.name.clone(),
            roots: self.summary.roots.clone(),
            missing_roots: self.summary.missing_roots.clone(),
            total_nodes: self.graph.node_count(),
            reachable: self.graph.reachable_count(),
            dead: self.dead.clone(),
        }
    }
}

impl<'p, P: ResolvedProgram + ?Sized> Analysis<'p, P> {
    pub fn new(program: &'p P) -> Self {
        Self {
            program,
            name: "program".to_string(),
            options: AnalysisOptions::default(),
        }
    }

    /// Label used in reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn roots(mut self, roots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn containment(mut self, containment: Containment) -> Self {
        self.options.containment = Some(containment);
        self
    }

    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the graph, compute reachability, collect findings.
    pub fn run(&self) -> Result<AnalysisResult> {
        let ignore = compile_patterns(&self.options.ignore)?;

        let mut graph = build_graph(self.program)
            .with_context(|| format!("Failed to build graph for {}", self.name))?;

        let roots = if self.options.roots.is_empty() {
            let found = main_entry_points(&graph);
            info!(program = %self.name, roots = found.len(), "no entry points configured, using top-level main functions");
            found
        } else {
            self.options.roots.clone()
        };

        let containment = self.options.containment.unwrap_or_default();
        let summary = compute_reachability_with(&mut graph, &roots, containment);
        let dead: Vec<DeadDeclaration> = find_dead_filtered(&graph, &ignore)
            .into_iter()
            .map(DeadDeclaration::from)
            .collect();
        let stats = graph.stats();

        info!(
            program = %self.name,
            nodes = graph.node_count(),
            reachable = summary.reachable(),
            dead = dead.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            name: self.name.clone(),
            graph,
            summary,
            dead,
            stats,
        })
    }
}

/// Qualified names of functions called `main` that sit directly in a file.
pub fn main_entry_points(graph: &Graph) -> Vec<String> {
    graph
        .nodes_of_type(NodeKind::Function)
        .filter(|n| n.simple_name() == DEFAULT_ENTRY_POINT)
        .filter(|n| graph.enclosing_parent(n).is_some_and(|p| p.is(NodeKind::File)))
        .map(|n| n.name().to_string())
        .collect()
}

/// Load one program file and analyze it.
pub fn analyze_program_file(path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult> {
    let program = load_program(path)
        .with_context(|| format!("Failed to load program {}", path.display()))?;
    let name = program
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());
    Analysis::new(&program)
        .named(name)
        .options(options.clone())
        .run()
}

/// Analyze independent program files in parallel, one graph per file.
///
/// Results come back in input order.
pub fn analyze_programs_parallel(
    paths: &[PathBuf],
    options: &AnalysisOptions,
) -> Vec<(PathBuf, Result<AnalysisResult>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), analyze_program_file(path, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{CallSite, Declaration, ProgramModel, SourceUnit};
    use std::fs;

    fn program() -> ProgramModel {
        ProgramModel::new(vec![SourceUnit::new("app/Main.kt", "app").with_declarations(vec![
            Declaration::function("main", vec![CallSite::new("app.used")]),
            Declaration::function("used", vec![]),
            Declaration::function("unused", vec![]),
            Declaration::class("Holder", vec![Declaration::function("main", vec![])]),
        ])])
    }

    #[test]
    fn test_run_with_roots() {
        let result = Analysis::new(&program()).roots(["app.main"]).run().unwrap();
        let dead: Vec<_> = result.dead.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(dead, vec!["app.unused", "app.Holder", "app.Holder.main"]);
        assert!(result.has_dead_code());
    }

    #[test]
    fn test_default_roots_are_top_level_main() {
        let program = program();
        let graph = build_graph(&program).unwrap();
        assert_eq!(main_entry_points(&graph), vec!["app.main"]);

        let result = Analysis::new(&program).run().unwrap();
        assert_eq!(result.summary.roots, vec!["app.main"]);
    }

    #[test]
    fn test_ignore_patterns() {
        let result = Analysis::new(&program())
            .roots(["app.main"])
            .ignore_patterns(["^app\\.Holder"])
            .run()
            .unwrap();
        assert_eq!(result.dead.len(), 1);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let err = Analysis::new(&program()).ignore_patterns(["("]).run();
        assert!(err.is_err());
    }

    #[test]
    fn test_build_error_propagates() {
        let program = ProgramModel::new(vec![
            SourceUnit::new("a/A.kt", "a").with_declarations(vec![Declaration::class("X", vec![])]),
            SourceUnit::new("a/A.kt", "a"),
        ]);
        let err = Analysis::new(&program).run().unwrap_err();
        assert!(err.to_string().contains("Failed to build graph"));
    }

    #[test]
    fn test_report() {
        let result = Analysis::new(&program())
            .named("sample")
            .roots(["app.main", "app.gone"])
            .run()
            .unwrap();
        let report = result.report();
        assert_eq!(report.program, "sample");
        assert_eq!(report.missing_roots, vec!["app.gone"]);
        assert_eq!(report.total_nodes, result.graph.node_count());
        assert_eq!(report.dead.len(), 3);
    }

    #[test]
    fn test_merge_config() {
        let config = crate::config::parse_config(
            "entry_points = [\"app.main\"]\nignore = [\"x\"]\ncontainment = \"strict\"",
        )
        .unwrap();
        let merged = AnalysisOptions::default().merge_config(&config);
        assert_eq!(merged.roots, vec!["app.main"]);
        assert_eq!(merged.ignore, vec!["x"]);
        assert_eq!(merged.containment, Some(Containment::Strict));

        let explicit = AnalysisOptions {
            roots: vec!["app.other".to_string()],
            containment: Some(Containment::LiveContainers),
            ..Default::default()
        }
        .merge_config(&config);
        assert_eq!(explicit.roots, vec!["app.other"]);
        assert_eq!(explicit.containment, Some(Containment::LiveContainers));
    }

    #[test]
    fn test_analyze_programs_parallel() {
        let dir = std::env::temp_dir().join("deadgraph_analysis_parallel");
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.json");
        let bad = dir.join("bad.json");
        let document = serde_json::to_string(&program().to_file()).unwrap();
        fs::write(&good, document).unwrap();
        fs::write(&bad, "not json").unwrap();

        let options = AnalysisOptions {
            roots: vec!["app.main".to_string()],
            ..Default::default()
        };
        let results = analyze_programs_parallel(&[good.clone(), bad.clone()], &options);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        let first = results[0].1.as_ref().unwrap();
        assert_eq!(first.name, "good");
        assert_eq!(first.dead.len(), 3);
        assert!(results[1].1.is_err());
    }
}
