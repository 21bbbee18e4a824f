//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use deadgraph_core::prelude::*;
//! ```

// Core types
pub use crate::error::{GraphError, GraphResult};
pub use crate::graph::Graph;
pub use crate::node::{EdgeKind, Node, NodeKind};

// Program input
pub use crate::program::{load_program, ProgramModel, ResolvedProgram};

// Graph building and traversal
pub use crate::builder::build_graph;
pub use crate::reachability::{compute_reachability, compute_reachability_with, Containment};

// Dead code detection
pub use crate::detect::find_dead;

// Builder API
pub use crate::analysis::{Analysis, AnalysisOptions, AnalysisResult};

// Configuration
pub use crate::config::{load_config, DeadgraphConfig};
