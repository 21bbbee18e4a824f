//! Graph store: owns all nodes and edges of one analysis pass.
//!
//! Backed by `petgraph::graph::DiGraph`, which never reorders indices as long
//! as nothing is removed, so node and edge indices double as insertion order.
//! A name index gives O(1) lookup by qualified name, and a flag per node holds
//! the result of the last reachability computation.
//!
//! The store is append-only. Reachability flags are only meaningful for the
//! graph state at the moment they were computed; adding nodes or edges
//! afterwards does not invalidate them.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

use crate::common::GraphTraversal;
use crate::error::{GraphError, GraphResult};
use crate::node::{Edge, EdgeKind, Node, NodeKind};

/// Stable handle of a node inside one `Graph`.
pub type NodeId = NodeIndex;

/// Declaration graph for one analysis pass.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    inner: DiGraph<Node, EdgeKind>,
    index: HashMap<String, NodeIndex>,
    reachable: Vec<bool>,
}

/// Summary counts of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub packages: usize,
    pub classes: usize,
    pub functions: usize,
    pub constructors: usize,
    pub encloses_edges: usize,
    pub calls_edges: usize,
    pub reachable: usize,
    pub unreachable: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Fails if a node with the same name already exists.
    pub fn add_node(&mut self, node: Node) -> GraphResult<NodeId> {
        if self.index.contains_key(node.name()) {
            return Err(GraphError::duplicate_node(node.name()));
        }
        let name = node.name().to_string();
        let id = self.inner.add_node(node);
        self.index.insert(name, id);
        self.reachable.push(false);
        Ok(id)
    }

    /// Insert a directed edge between two existing nodes, addressed by name.
    ///
    /// Identical edges are stored once. A node can have only one ENCLOSES
    /// parent.
    pub fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> GraphResult<()> {
        let from = self.require(source)?;
        let to = self.require(target)?;

        if self
            .inner
            .edges_connecting(from, to)
            .any(|e| *e.weight() == kind)
        {
            return Ok(());
        }

        if kind == EdgeKind::Encloses {
            if let Some(parent) = self.parent_id(to) {
                return Err(GraphError::DuplicateParent {
                    name: target.to_string(),
                    existing: self.inner[parent].name().to_string(),
                    requested: source.to_string(),
                });
            }
        }

        trace!(source = %source, target = %target, kind = %kind, "edge added");
        self.inner.add_edge(from, to, kind);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Exact lookup by qualified name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&id| &self.inner[id])
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// All nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.inner.node_indices().map(move |id| &self.inner[id])
    }

    /// Nodes satisfying `predicate`, in insertion order. Evaluated lazily
    /// against the current store.
    pub fn nodes<'g, P>(&'g self, mut predicate: P) -> impl Iterator<Item = &'g Node> + 'g
    where
        P: FnMut(&Node) -> bool + 'g,
    {
        self.all_nodes().filter(move |n| predicate(*n))
    }

    /// Nodes of one kind, in insertion order.
    pub fn nodes_of_type(&self, kind: NodeKind) -> impl Iterator<Item = &Node> + '_ {
        self.all_nodes().filter(move |n| n.kind() == kind)
    }

    /// First node (insertion order) whose simple name matches.
    pub fn node_by_simple_name(&self, simple_name: &str) -> Option<&Node> {
        self.all_nodes().find(|n| n.simple_name() == simple_name)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> + '_ {
        self.inner
            .edge_indices()
            .filter_map(move |e| self.edge_at(e))
    }

    /// Edges whose source is `node`, in insertion order.
    pub fn outgoing_edges(&self, node: &Node) -> Vec<Edge<'_>> {
        self.edges_in_direction(node, Direction::Outgoing)
    }

    /// Edges whose target is `node`, in insertion order.
    pub fn incoming_edges(&self, node: &Node) -> Vec<Edge<'_>> {
        self.edges_in_direction(node, Direction::Incoming)
    }

    /// The node that ENCLOSES `node`, if any.
    pub fn enclosing_parent(&self, node: &Node) -> Option<&Node> {
        let id = self.node_id(node.name())?;
        self.parent_id(id).map(|p| &self.inner[p])
    }

    /// Current reachability flag. False for nodes not in this graph.
    pub fn is_reachable(&self, node: &Node) -> bool {
        self.node_id(node.name())
            .is_some_and(|id| self.reachable[id.index()])
    }

    pub fn is_reachable_name(&self, name: &str) -> bool {
        self.node_id(name).is_some_and(|id| self.reachable[id.index()])
    }

    pub fn reachable_count(&self) -> usize {
        self.reachable.iter().filter(|r| **r).count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in self.all_nodes() {
            match node.kind() {
                NodeKind::File => stats.files += 1,
                NodeKind::Package => stats.packages += 1,
                NodeKind::Class => stats.classes += 1,
                NodeKind::Function => stats.functions += 1,
                NodeKind::Constructor => stats.constructors += 1,
            }
        }
        for e in self.inner.edge_indices() {
            match self.inner[e] {
                EdgeKind::Encloses => stats.encloses_edges += 1,
                EdgeKind::Calls => stats.calls_edges += 1,
            }
        }
        stats.reachable = self.reachable_count();
        stats.unreachable = self.node_count() - stats.reachable;
        stats
    }

    // ------------------------------------------------------------------
    // Index-level access used by the reachability engine
    // ------------------------------------------------------------------

    pub(crate) fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.inner
            .edges_directed(id, Direction::Incoming)
            .find(|e| *e.weight() == EdgeKind::Encloses)
            .map(|e| e.source())
    }

    pub(crate) fn mark_reachable(&mut self, id: NodeId) -> bool {
        let slot = &mut self.reachable[id.index()];
        let newly = !*slot;
        *slot = true;
        newly
    }

    pub(crate) fn clear_reachability(&mut self) {
        self.reachable.iter_mut().for_each(|r| *r = false);
    }

    fn require(&self, name: &str) -> GraphResult<NodeIndex> {
        self.node_id(name)
            .ok_or_else(|| GraphError::unknown_node(name))
    }

    fn edge_at(&self, e: EdgeIndex) -> Option<Edge<'_>> {
        let (source, target) = self.inner.edge_endpoints(e)?;
        Some(Edge {
            source: &self.inner[source],
            target: &self.inner[target],
            kind: self.inner[e],
        })
    }

    fn edges_in_direction(&self, node: &Node, dir: Direction) -> Vec<Edge<'_>> {
        let Some(id) = self.node_id(node.name()) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first
        let mut ids: Vec<EdgeIndex> = self.inner.edges_directed(id, dir).map(|e| e.id()).collect();
        ids.sort_unstable();
        ids.into_iter().filter_map(|e| self.edge_at(e)).collect()
    }
}

impl GraphTraversal for Graph {
    type Node = NodeId;

    fn neighbors(&self, node: &NodeId) -> Vec<NodeId> {
        let mut out: Vec<(EdgeIndex, NodeId)> = self
            .inner
            .edges_directed(*node, Direction::Outgoing)
            .filter(|e| e.weight().is_traversable())
            .map(|e| (e.id(), e.target()))
            .collect();
        out.sort_unstable_by_key(|(e, _)| *e);
        out.into_iter().map(|(_, n)| n).collect()
    }

    fn contains_node(&self, node: &NodeId) -> bool {
        node.index() < self.inner.node_count()
    }
}
