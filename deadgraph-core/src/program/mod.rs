//! Resolved-program interface consumed by the graph builder.
//!
//! A front end (parser plus symbol resolver) hands the builder an object
//! implementing [`ResolvedProgram`]: enumerable source units with their
//! declaration trees, and a call-resolution function. The builder depends on
//! nothing else.
//!
//! [`ProgramModel`] is a serde-backed implementation for programs that were
//! resolved ahead of time and stored as JSON.

use serde::{Deserialize, Serialize};

use crate::common::QualifiedNameBuilder;
use crate::node::{NodeKind, SourcePosition};

pub mod model;

pub use model::{load_program, parse_program, ProgramFile, ProgramModel};

/// Name segment used for constructors: `package.Class.<init>`.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Package node name for units that declare no package.
pub const ROOT_PACKAGE: &str = "<root>";

/// A call expression inside an executable body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Symbol the front end bound this call to. Either a declaration's
    /// qualified name, or a class name for constructor invocations.
    pub callee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

impl CallSite {
    pub fn new(callee: impl Into<String>) -> Self {
        Self {
            callee: callee.into(),
            position: None,
        }
    }
}

/// One node of a unit's declaration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Class {
        name: String,
        #[serde(default)]
        members: Vec<Declaration>,
        /// Calls made by property initializers and init blocks.
        #[serde(default)]
        initializer_calls: Vec<CallSite>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourcePosition>,
    },
    Function {
        name: String,
        /// `None` for declarations without a body (abstract, expect).
        #[serde(default)]
        body: Option<Vec<CallSite>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourcePosition>,
    },
    Constructor {
        #[serde(default)]
        body: Option<Vec<CallSite>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourcePosition>,
    },
}

impl Declaration {
    pub fn class(name: impl Into<String>, members: Vec<Declaration>) -> Self {
        Declaration::Class {
            name: name.into(),
            members,
            initializer_calls: Vec::new(),
            position: None,
        }
    }

    pub fn function(name: impl Into<String>, calls: Vec<CallSite>) -> Self {
        Declaration::Function {
            name: name.into(),
            body: Some(calls),
            position: None,
        }
    }

    /// A function declared without a body.
    pub fn abstract_function(name: impl Into<String>) -> Self {
        Declaration::Function {
            name: name.into(),
            body: None,
            position: None,
        }
    }

    pub fn constructor(calls: Vec<CallSite>) -> Self {
        Declaration::Constructor {
            body: Some(calls),
            position: None,
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            Declaration::Class { .. } => NodeKind::Class,
            Declaration::Function { .. } => NodeKind::Function,
            Declaration::Constructor { .. } => NodeKind::Constructor,
        }
    }

    /// Name segment this declaration contributes to its qualified name.
    pub fn segment(&self) -> &str {
        match self {
            Declaration::Class { name, .. } | Declaration::Function { name, .. } => name,
            Declaration::Constructor { .. } => CONSTRUCTOR_NAME,
        }
    }

    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            Declaration::Class { position, .. }
            | Declaration::Function { position, .. }
            | Declaration::Constructor { position, .. } => position.as_ref(),
        }
    }
}

/// A compiled source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Path of the file, used as the FILE node name.
    pub path: String,
    /// Declared package; empty for the root package.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Calls made by top-level property initializers.
    #[serde(default)]
    pub initializer_calls: Vec<CallSite>,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            declarations: Vec::new(),
            initializer_calls: Vec::new(),
        }
    }

    pub fn with_declarations(mut self, declarations: Vec<Declaration>) -> Self {
        self.declarations = declarations;
        self
    }

    /// Name of the PACKAGE node enclosing this unit.
    pub fn package_node_name(&self) -> &str {
        if self.package.is_empty() {
            ROOT_PACKAGE
        } else {
            &self.package
        }
    }
}

/// The declaration a call resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Qualified name of the target's node.
    pub name: String,
    pub kind: NodeKind,
    pub simple_name: String,
    /// Qualified name of the declaration that encloses the target, used when
    /// the target node must be created on demand.
    pub owner: Option<String>,
}

/// Handle on a program whose symbols are already resolved.
pub trait ResolvedProgram {
    fn units(&self) -> &[SourceUnit];

    /// Resolve a call site to the declaration it invokes. `None` means the
    /// target is outside the analyzed program.
    fn resolve(&self, call: &CallSite) -> Option<ResolvedTarget>;
}

/// Lexical scope stack: package segment followed by enclosing classes.
#[derive(Debug, Clone, Default)]
pub struct DeclScope {
    stack: Vec<String>,
}

impl DeclScope {
    pub fn for_package(package: &str) -> Self {
        Self {
            stack: vec![package.to_string()],
        }
    }

    pub fn push(&mut self, segment: &str) {
        self.stack.push(segment.to_string());
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

impl QualifiedNameBuilder for DeclScope {
    fn current_scope(&self) -> &[String] {
        &self.stack
    }
}
