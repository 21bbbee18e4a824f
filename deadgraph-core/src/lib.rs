//! deadgraph-core: declaration graph and reachability engine for dead code
//! detection.
//!
//! Given a resolved program, builds a directed graph whose nodes are
//! declarations (files, packages, classes, functions, constructors) and whose
//! edges are containment (`ENCLOSES`) and invocation (`CALLS`) relationships,
//! then computes which nodes are reachable from a set of entry points.
//! Unreachable classes and functions are dead-code candidates.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deadgraph_core::prelude::*;
//!
//! let program = load_program(Path::new("program.json"))?;
//! let mut graph = build_graph(&program)?;
//! compute_reachability(&mut graph, ["myapp.main"]);
//!
//! for dead in find_dead(&graph) {
//!     println!("Dead: {}", dead);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`node`]: node/edge model
//! - [`graph`]: graph store with indexed lookup
//! - [`program`]: resolved-program interface and JSON-backed model
//! - [`builder`]: graph construction from a resolved program
//! - [`reachability`]: reachability engine
//! - [`detect`]: dead declaration query
//! - [`analysis`]: fluent API over a whole pass, parallel multi-program runs
//! - [`report`], [`export`], [`visualize`]: output
//! - [`config`], [`logging`], [`scan`], [`error`]: surrounding plumbing
//!
//! # Cargo Features
//!
//! - `dot` (default): Graphviz DOT export

pub mod analysis;
pub mod builder;
pub mod common;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod graph;
pub mod logging;
pub mod node;
pub mod prelude;
pub mod program;
pub mod reachability;
pub mod report;
pub mod scan;

#[cfg(feature = "dot")]
pub mod visualize;

pub use common::GraphTraversal;

// Error types
pub use error::{GraphError, GraphResult, IoResultExt};

// Model and store
pub use graph::{Graph, GraphStats, NodeId};
pub use node::{Edge, EdgeKind, Node, NodeKind, SourcePosition};

// Program input
pub use program::{
    load_program, parse_program, CallSite, Declaration, ProgramFile, ProgramModel,
    ResolvedProgram, ResolvedTarget, SourceUnit, CONSTRUCTOR_NAME, ROOT_PACKAGE,
};

// Construction and reachability
pub use builder::{build_graph, GraphBuilder};
pub use reachability::{
    compute_reachability, compute_reachability_with, Containment, ReachabilitySummary,
};

// Detection and analysis
pub use analysis::{
    analyze_program_file, analyze_programs_parallel, main_entry_points, Analysis,
    AnalysisOptions, AnalysisResult,
};
pub use detect::{find_dead, find_dead_filtered, DeadDeclaration};

// Configuration
pub use config::{load_config, parse_config, DeadgraphConfig, OutputConfig};

// Logging
pub use logging::init_structured_logging;

// Output
pub use export::{graph_to_visualizer_json, to_visualizer_graph, VisualizerEdge, VisualizerGraph, VisualizerNode};
pub use report::{print_json, print_plain, render_plain, reports_to_json, DeadCodeReport};

// Discovery
pub use scan::{gather_program_files, gather_program_files_with_excludes};

#[cfg(feature = "dot")]
pub use visualize::generate_dot;
