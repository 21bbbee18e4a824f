//! Dead declaration detection.
//!
//! A dead-code candidate (class or function) whose reachability flag is unset
//! after [`compute_reachability`](crate::reachability::compute_reachability)
//! is dead.

use regex::Regex;
use serde::Serialize;

use crate::graph::Graph;
use crate::node::{Node, NodeKind, SourcePosition};

/// A finding produced from one unreachable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadDeclaration {
    pub name: String,
    pub kind: NodeKind,
    pub simple_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

impl From<&Node> for DeadDeclaration {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            kind: node.kind(),
            simple_name: node.simple_name().to_string(),
            position: node.position().cloned(),
        }
    }
}

/// Unreachable dead-code candidates, in insertion order.
pub fn find_dead(graph: &Graph) -> Vec<&Node> {
    graph
        .nodes(move |n| n.kind().is_dead_code_candidate() && !graph.is_reachable(n))
        .collect()
}

/// Like [`find_dead`], dropping names that match any ignore pattern.
pub fn find_dead_filtered<'g>(graph: &'g Graph, ignore: &[Regex]) -> Vec<&'g Node> {
    find_dead(graph)
        .into_iter()
        .filter(|n| !is_ignored(n.name(), ignore))
        .collect()
}

pub fn is_ignored(name: &str, ignore: &[Regex]) -> bool {
    ignore.iter().any(|re| re.is_match(name))
}
