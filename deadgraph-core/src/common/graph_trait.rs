//! Shared graph traversal abstraction.
//!
//! The reachability engine is written against this trait rather than the
//! concrete store, so the same BFS also serves small ad-hoc graphs in tests.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Trait for graph traversal operations.
///
/// # Type Parameters
/// - `Node`: The node identifier type (e.g., a petgraph index or a name)
///
/// # Example
/// ```ignore
/// impl GraphTraversal for Graph {
///     type Node = NodeId;
///
///     fn neighbors(&self, node: &NodeId) -> Vec<NodeId> { ... }
///     fn contains_node(&self, node: &NodeId) -> bool { ... }
/// }
///
/// let reachable = graph.visit_from(root_ids, |id| println!("{id:?}"));
/// ```
pub trait GraphTraversal {
    /// The type used to identify nodes in the graph.
    type Node: Clone + Eq + Hash;

    /// Successors of a node along traversable edges, in a stable order.
    fn neighbors(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Checks if the graph contains a node.
    fn contains_node(&self, node: &Self::Node) -> bool;

    /// Multi-source BFS over all roots at once, calling `on_visit` once per
    /// node in discovery order. Returns the visited set.
    ///
    /// Roots absent from the graph are skipped. Each node is enqueued at
    /// most once, so cycles and self-loops terminate in O(|V| + |E|).
    fn visit_from<I, F>(&self, roots: I, mut on_visit: F) -> HashSet<Self::Node>
    where
        I: IntoIterator<Item = Self::Node>,
        F: FnMut(&Self::Node),
    {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        for root in roots {
            if self.contains_node(&root) && visited.insert(root.clone()) {
                on_visit(&root);
                queue.push_back(root);
            }
        }

        while let Some(node) = queue.pop_front() {
            for neighbor in self.neighbors(&node) {
                if visited.insert(neighbor.clone()) {
                    on_visit(&neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        visited
    }
}
