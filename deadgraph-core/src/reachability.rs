//! Reachability engine.
//!
//! A single multi-source BFS from the entry points over outgoing CALLS and
//! ENCLOSES edges, writing the result into the graph's reachability flags.
//!
//! Performance characteristics:
//! - Traversal: O(|V| + |E|), each node enqueued at most once
//! - Container lifting: O(|V|), each ancestor climbed at most once
//!
//! Flags are cleared first, so repeated calls with the same roots produce the
//! same result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::common::GraphTraversal;
use crate::graph::{Graph, NodeId};

/// How containment interacts with reachability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Containment {
    /// Edge paths only, and the enclosing chain of every reached node is
    /// also marked. Ancestors marked this way are not expanded, so their
    /// other members stay unreachable unless some path reaches them.
    #[default]
    LiveContainers,
    /// A node is reachable iff a directed CALLS/ENCLOSES path from a root
    /// reaches it.
    Strict,
}

impl Containment {
    pub fn as_str(self) -> &'static str {
        match self {
            Containment::LiveContainers => "live-containers",
            Containment::Strict => "strict",
        }
    }
}

impl fmt::Display for Containment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one reachability computation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReachabilitySummary {
    /// Root names found in the graph, in the order given.
    pub roots: Vec<String>,
    /// Root names with no matching node.
    pub missing_roots: Vec<String>,
    /// Nodes reached along edges (roots included).
    pub traversed: usize,
    /// Additional nodes marked as enclosing containers.
    pub containers: usize,
}

impl ReachabilitySummary {
    pub fn reachable(&self) -> usize {
        self.traversed + self.containers
    }
}

/// Compute reachability from `roots` with the default containment mode.
pub fn compute_reachability<I, S>(graph: &mut Graph, roots: I) -> ReachabilitySummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compute_reachability_with(graph, roots, Containment::default())
}

/// Compute reachability from `roots`.
///
/// Root names are matched exactly against qualified node names; names with
/// no node are logged and ignored.
pub fn compute_reachability_with<I, S>(
    graph: &mut Graph,
    roots: I,
    containment: Containment,
) -> ReachabilitySummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    graph.clear_reachability();

    let mut summary = ReachabilitySummary::default();
    let mut root_ids: Vec<NodeId> = Vec::new();
    for root in roots {
        let name = root.as_ref();
        match graph.node_id(name) {
            Some(id) => {
                if !root_ids.contains(&id) {
                    root_ids.push(id);
                    summary.roots.push(name.to_string());
                }
            }
            None => {
                warn!(root = %name, "entry point not found in graph");
                summary.missing_roots.push(name.to_string());
            }
        }
    }

    // The traversal borrows the store, so flags are written once it is done.
    let mut reached: Vec<NodeId> = Vec::new();
    graph.visit_from(root_ids, |id| reached.push(*id));
    for &id in &reached {
        graph.mark_reachable(id);
    }
    summary.traversed = reached.len();

    if containment == Containment::LiveContainers {
        summary.containers = lift_containers(graph, &reached);
    }

    debug!(
        roots = summary.roots.len(),
        missing_roots = summary.missing_roots.len(),
        traversed = summary.traversed,
        containers = summary.containers,
        containment = %containment,
        "reachability computed"
    );
    summary
}

/// Mark the ENCLOSES ancestors of every reached node. Returns how many
/// nodes became reachable only through this step.
fn lift_containers(graph: &mut Graph, reached: &[NodeId]) -> usize {
    let mut climbed: HashSet<NodeId> = HashSet::new();
    let mut newly_marked = 0;

    for &start in reached {
        let mut current = start;
        while let Some(parent) = graph.parent_id(current) {
            if !climbed.insert(parent) {
                break;
            }
            if graph.mark_reachable(parent) {
                newly_marked += 1;
            }
            current = parent;
        }
    }
    newly_marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{EdgeKind, Node};

    /// pkg -> file -> {Used -> used(), Unused -> unused(), main}
    /// main -CALLS-> used
    fn graph() -> Graph {
        let mut g = Graph::new();
        for node in [
            Node::package("pkg"),
            Node::file("pkg/F.kt"),
            Node::class("pkg.Used"),
            Node::function("pkg.Used.used"),
            Node::class("pkg.Unused"),
            Node::function("pkg.Unused.unused"),
            Node::function("pkg.main"),
        ] {
            g.add_node(node).unwrap();
        }
        let enclose = [
            ("pkg", "pkg/F.kt"),
            ("pkg/F.kt", "pkg.Used"),
            ("pkg.Used", "pkg.Used.used"),
            ("pkg/F.kt", "pkg.Unused"),
            ("pkg.Unused", "pkg.Unused.unused"),
            ("pkg/F.kt", "pkg.main"),
        ];
        for (from, to) in enclose {
            g.add_edge(from, to, EdgeKind::Encloses).unwrap();
        }
        g.add_edge("pkg.main", "pkg.Used.used", EdgeKind::Calls).unwrap();
        g
    }

    fn reachable_names(g: &Graph) -> Vec<String> {
        g.nodes(move |n| g.is_reachable(n))
            .map(|n| n.name().to_string())
            .collect()
    }

    #[test]
    fn test_strict_follows_edges_only() {
        let mut g = graph();
        compute_reachability_with(&mut g, ["pkg.main"], Containment::Strict);
        assert_eq!(reachable_names(&g), vec!["pkg.Used.used", "pkg.main"]);
    }

    #[test]
    fn test_live_containers_marks_ancestors() {
        let mut g = graph();
        let summary = compute_reachability(&mut g, ["pkg.main"]);
        assert_eq!(
            reachable_names(&g),
            vec!["pkg", "pkg/F.kt", "pkg.Used", "pkg.Used.used", "pkg.main"]
        );
        assert_eq!(summary.traversed, 2);
        assert_eq!(summary.containers, 3);
        assert_eq!(summary.reachable(), g.reachable_count());
    }

    #[test]
    fn test_lifted_containers_not_expanded() {
        let mut g = graph();
        compute_reachability(&mut g, ["pkg.main"]);
        assert!(!g.is_reachable_name("pkg.Unused"));
        assert!(!g.is_reachable_name("pkg.Unused.unused"));
    }

    #[test]
    fn test_enclosing_root_reaches_members() {
        let mut g = graph();
        compute_reachability_with(&mut g, ["pkg.Unused"], Containment::Strict);
        assert!(g.is_reachable_name("pkg.Unused"));
        assert!(g.is_reachable_name("pkg.Unused.unused"));
        assert!(!g.is_reachable_name("pkg.main"));
    }

    #[test]
    fn test_missing_root_ignored() {
        let mut g = graph();
        let summary = compute_reachability(&mut g, ["pkg.nothing"]);
        assert_eq!(summary.missing_roots, vec!["pkg.nothing"]);
        assert!(summary.roots.is_empty());
        assert_eq!(g.reachable_count(), 0);
    }

    #[test]
    fn test_recomputation_resets_flags() {
        let mut g = graph();
        compute_reachability(&mut g, ["pkg.Unused"]);
        assert!(g.is_reachable_name("pkg.Unused.unused"));

        compute_reachability(&mut g, ["pkg.main"]);
        assert!(!g.is_reachable_name("pkg.Unused.unused"));
    }

    #[test]
    fn test_duplicate_roots_counted_once() {
        let mut g = graph();
        let summary = compute_reachability(&mut g, ["pkg.main", "pkg.main"]);
        assert_eq!(summary.roots, vec!["pkg.main"]);
    }

    #[test]
    fn test_containment_names() {
        assert_eq!(Containment::default().to_string(), "live-containers");
        let strict: Containment = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(strict, Containment::Strict);
        assert_eq!(strict.as_str(), "strict");
    }
}
