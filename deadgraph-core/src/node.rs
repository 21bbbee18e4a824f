//! Node and edge model for the declaration graph.
//!
//! Nodes are identified by their fully-qualified name alone: two nodes are
//! equal iff their names are equal, whatever payload they carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Classification of a graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    File,
    Package,
    Class,
    Function,
    Constructor,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::File,
        NodeKind::Package,
        NodeKind::Class,
        NodeKind::Function,
        NodeKind::Constructor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "FILE",
            NodeKind::Package => "PACKAGE",
            NodeKind::Class => "CLASS",
            NodeKind::Function => "FUNCTION",
            NodeKind::Constructor => "CONSTRUCTOR",
        }
    }

    /// Program declarations, as opposed to structural containers.
    pub fn is_declaration(self) -> bool {
        match self {
            NodeKind::Class | NodeKind::Function | NodeKind::Constructor => true,
            NodeKind::File | NodeKind::Package => false,
        }
    }

    /// Kinds reported by the dead-code rule when unreachable.
    pub fn is_dead_code_candidate(self) -> bool {
        match self {
            NodeKind::Class | NodeKind::Function => true,
            NodeKind::File | NodeKind::Package | NodeKind::Constructor => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a directed relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Containment: package -> file, file -> class/function, class -> member.
    Encloses,
    /// Invocation from a call site's enclosing declaration to the callee.
    Calls,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Encloses => "ENCLOSES",
            EdgeKind::Calls => "CALLS",
        }
    }

    /// Whether reachability propagates along this edge kind.
    pub fn is_traversable(self) -> bool {
        match self {
            EdgeKind::Encloses | EdgeKind::Calls => true,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declaration appears in its source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: String,
    /// 1-indexed
    pub line: usize,
    /// 1-indexed
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A declaration vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    name: String,
    kind: NodeKind,
    simple_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<SourcePosition>,
}

impl Node {
    /// Create a node. The simple name defaults to the last dotted segment.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let name = name.into();
        let simple_name = simple_name_of(&name).to_string();
        Self {
            name,
            kind,
            simple_name,
            position: None,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        let mut node = Self::new(path, NodeKind::File);
        node.simple_name = file_stem_of(&node.name).to_string();
        node
    }

    pub fn package(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            simple_name: name.clone(),
            name,
            kind: NodeKind::Package,
            position: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Class)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Function)
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Constructor)
    }

    pub fn with_simple_name(mut self, simple_name: impl Into<String>) -> Self {
        self.simple_name = simple_name.into();
        self
    }

    pub fn with_position(mut self, position: Option<SourcePosition>) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn position(&self) -> Option<&SourcePosition> {
        self.position.as_ref()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A directed edge with borrowed endpoints. The graph owns the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<'g> {
    pub source: &'g Node,
    pub target: &'g Node,
    pub kind: EdgeKind,
}

fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn file_stem_of(path: &str) -> &str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}
