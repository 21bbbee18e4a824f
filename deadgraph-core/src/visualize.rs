//! Graphviz DOT visualization for declaration graphs.
//!
//! Uses the `std::fmt::Write` trait over a pre-allocated buffer.

use std::fmt::Write;

use crate::graph::Graph;
use crate::node::{EdgeKind, NodeKind};

/// Generate a Graphviz DOT representation of the graph.
///
/// - reachable nodes are lightgreen, unreachable nodes lightcoral
/// - shapes follow node kind (folder, note, box, ellipse, diamond)
/// - CALLS edges are solid, ENCLOSES edges dashed
pub fn generate_dot(graph: &Graph) -> String {
    // ~90 bytes/node + ~60 bytes/edge + header/footer
    let estimated_capacity = (graph.node_count() * 90) + (graph.edge_count() * 60) + 150;
    let mut dot = String::with_capacity(estimated_capacity);

    if let Err(e) = write_dot_content(&mut dot, graph) {
        tracing::error!(error = %e, "failed to generate DOT string");
        return "digraph deadgraph {\n}\n".to_string();
    }

    dot
}

fn shape(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Package => "folder",
        NodeKind::File => "note",
        NodeKind::Class => "box",
        NodeKind::Function => "ellipse",
        NodeKind::Constructor => "diamond",
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_dot_content(dot: &mut String, graph: &Graph) -> std::fmt::Result {
    writeln!(dot, "digraph deadgraph {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(dot, "  node [style=filled, fontname=\"JetBrains Mono\"];")?;
    writeln!(dot)?;

    for node in graph.all_nodes() {
        let color = if graph.is_reachable(node) {
            "lightgreen"
        } else {
            "lightcoral"
        };
        writeln!(
            dot,
            "  \"{}\" [label=\"{}\", shape={}, fillcolor={}];",
            escape(node.name()),
            escape(node.simple_name()),
            shape(node.kind()),
            color
        )?;
    }

    writeln!(dot)?;

    for edge in graph.edges() {
        let style = match edge.kind {
            EdgeKind::Calls => "solid",
            EdgeKind::Encloses => "dashed",
        };
        writeln!(
            dot,
            "  \"{}\" -> \"{}\" [style={}];",
            escape(edge.source.name()),
            escape(edge.target.name()),
            style
        )?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}
