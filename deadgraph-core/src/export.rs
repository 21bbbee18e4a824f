//! JSON export of the declaration graph.
//!
//! Typed structures with numeric node ids (insertion order), so consumers
//! can draw the graph without re-deriving identity from names.
//!
//! ```json
//! {
//!   "nodes": [{ "id": 0, "name": "test", "kind": "PACKAGE", "dead": false }],
//!   "edges": [{ "from": 0, "to": 1, "kind": "ENCLOSES" }]
//! }
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::graph::{Graph, GraphStats};
use crate::node::{EdgeKind, NodeKind};

/// A node in the visualizer JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizerNode {
    pub id: usize,
    pub name: String,
    pub simple_name: String,
    pub kind: NodeKind,
    pub dead: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// An edge in the visualizer JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizerEdge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

/// Complete visualizer graph structure.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizerGraph {
    pub nodes: Vec<VisualizerNode>,
    pub edges: Vec<VisualizerEdge>,
    pub stats: GraphStats,
}

/// Build a typed `VisualizerGraph` from the current graph state.
pub fn to_visualizer_graph(graph: &Graph) -> VisualizerGraph {
    let mut ids: HashMap<&str, usize> = HashMap::with_capacity(graph.node_count());

    let nodes: Vec<VisualizerNode> = graph
        .all_nodes()
        .enumerate()
        .map(|(id, node)| {
            ids.insert(node.name(), id);
            VisualizerNode {
                id,
                name: node.name().to_string(),
                simple_name: node.simple_name().to_string(),
                kind: node.kind(),
                dead: !graph.is_reachable(node),
                position: node.position().map(|p| p.to_string()),
            }
        })
        .collect();

    let edges: Vec<VisualizerEdge> = graph
        .edges()
        .filter_map(|edge| {
            Some(VisualizerEdge {
                from: *ids.get(edge.source.name())?,
                to: *ids.get(edge.target.name())?,
                kind: edge.kind,
            })
        })
        .collect();

    VisualizerGraph {
        nodes,
        edges,
        stats: graph.stats(),
    }
}

/// Export the graph to visualizer-compatible JSON.
pub fn graph_to_visualizer_json(graph: &Graph) -> serde_json::Value {
    serde_json::to_value(to_visualizer_graph(graph)).unwrap_or_default()
}
