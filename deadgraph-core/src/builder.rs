//! Graph builder: translates a resolved program into nodes and edges.
//!
//! Two passes over the units:
//!
//! 1. **Declare**: FILE and PACKAGE nodes, then every class, function and
//!    constructor with an ENCLOSES edge from its lexical parent.
//! 2. **Link**: every call site in every executable body is resolved; a
//!    resolved call becomes a CALLS edge from the enclosing declaration to
//!    the target. Targets the first pass never declared (implicit default
//!    constructors, for instance) are created on demand.
//!
//! Declaring everything before linking means forward references and
//! cross-file calls need no special handling.

use tracing::{debug, trace};

use crate::common::QualifiedNameBuilder;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::node::{EdgeKind, Node, NodeKind};
use crate::program::{CallSite, DeclScope, Declaration, ResolvedProgram, ResolvedTarget, SourceUnit};

/// Builds one [`Graph`] from one resolved program.
pub struct GraphBuilder<'p, P: ResolvedProgram + ?Sized> {
    program: &'p P,
    graph: Graph,
    resolved_calls: usize,
    unresolved_calls: usize,
    on_demand_nodes: usize,
}

impl<'p, P: ResolvedProgram + ?Sized> GraphBuilder<'p, P> {
    pub fn new(program: &'p P) -> Self {
        Self {
            program,
            graph: Graph::new(),
            resolved_calls: 0,
            unresolved_calls: 0,
            on_demand_nodes: 0,
        }
    }

    /// Run both passes. Structural errors abort the build.
    pub fn build(mut self) -> GraphResult<Graph> {
        let program = self.program;
        let units = program.units();

        for unit in units {
            self.declare_unit(unit)?;
        }
        for unit in units {
            self.link_unit(unit)?;
        }

        debug!(
            units = units.len(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            resolved_calls = self.resolved_calls,
            unresolved_calls = self.unresolved_calls,
            on_demand_nodes = self.on_demand_nodes,
            "graph built"
        );
        Ok(self.graph)
    }

    fn declare_unit(&mut self, unit: &SourceUnit) -> GraphResult<()> {
        self.graph.add_node(Node::file(unit.path.as_str()))?;

        let package = unit.package_node_name();
        match self.graph.node(package) {
            Some(existing) if existing.is(NodeKind::Package) => {}
            Some(_) => return Err(GraphError::duplicate_node(package)),
            None => {
                self.graph.add_node(Node::package(package))?;
            }
        }
        self.graph.add_edge(package, &unit.path, EdgeKind::Encloses)?;

        let mut scope = DeclScope::for_package(&unit.package);
        let graph = &mut self.graph;
        walk_declarations(
            &unit.declarations,
            &mut scope,
            &unit.path,
            None,
            &mut |decl, qualified, parent, enclosing_class| {
                let node = match decl {
                    Declaration::Class { name, .. } => Node::class(qualified).with_simple_name(name),
                    Declaration::Function { name, .. } => {
                        Node::function(qualified).with_simple_name(name)
                    }
                    Declaration::Constructor { .. } => {
                        let Some(class) = enclosing_class else {
                            return Err(GraphError::invalid_argument(format!(
                                "constructor declared outside of a class in {}",
                                unit.path
                            )));
                        };
                        Node::constructor(qualified).with_simple_name(class)
                    }
                };
                graph.add_node(node.with_position(decl.position().cloned()))?;
                graph.add_edge(parent, qualified, EdgeKind::Encloses)
            },
        )
    }

    fn link_unit(&mut self, unit: &SourceUnit) -> GraphResult<()> {
        for call in &unit.initializer_calls {
            self.link_call(&unit.path, call)?;
        }

        // Collected first: the walk borrows the unit, linking borrows self.
        let mut bodies: Vec<(String, &[CallSite])> = Vec::new();
        let mut scope = DeclScope::for_package(&unit.package);
        walk_declarations(
            &unit.declarations,
            &mut scope,
            &unit.path,
            None,
            &mut |decl, qualified, _, _| {
                let calls: &[CallSite] = match decl {
                    Declaration::Class {
                        initializer_calls, ..
                    } => initializer_calls,
                    Declaration::Function { body, .. } | Declaration::Constructor { body, .. } => {
                        body.as_deref().unwrap_or_default()
                    }
                };
                if !calls.is_empty() {
                    bodies.push((qualified.to_string(), calls));
                }
                Ok(())
            },
        )?;

        for (caller, calls) in bodies {
            for call in calls {
                self.link_call(&caller, call)?;
            }
        }
        Ok(())
    }

    fn link_call(&mut self, caller: &str, call: &CallSite) -> GraphResult<()> {
        let Some(target) = self.program.resolve(call) else {
            trace!(caller = %caller, callee = %call.callee, "unresolved call skipped");
            self.unresolved_calls += 1;
            return Ok(());
        };
        self.ensure_target(&target)?;
        self.resolved_calls += 1;
        self.graph.add_edge(caller, &target.name, EdgeKind::Calls)
    }

    fn ensure_target(&mut self, target: &ResolvedTarget) -> GraphResult<()> {
        if self.graph.contains(&target.name) {
            return Ok(());
        }
        if !target.kind.is_declaration() {
            return Err(GraphError::invalid_argument(format!(
                "call resolved to {} '{}', which is not a declaration",
                target.kind, target.name
            )));
        }
        self.graph.add_node(
            Node::new(target.name.as_str(), target.kind).with_simple_name(target.simple_name.as_str()),
        )?;
        self.on_demand_nodes += 1;
        trace!(name = %target.name, kind = %target.kind, "node created on demand");

        if let Some(owner) = target.owner.as_deref() {
            if self.graph.contains(owner) {
                self.graph.add_edge(owner, &target.name, EdgeKind::Encloses)?;
            }
        }
        Ok(())
    }
}

/// Shorthand for `GraphBuilder::new(program).build()`.
pub fn build_graph<P: ResolvedProgram + ?Sized>(program: &P) -> GraphResult<Graph> {
    GraphBuilder::new(program).build()
}

/// Depth-first walk over a declaration tree.
///
/// `visit` receives the declaration, its qualified name, the qualified name
/// of its lexical parent, and the simple name of the enclosing class.
fn walk_declarations<'d, F>(
    decls: &'d [Declaration],
    scope: &mut DeclScope,
    parent: &str,
    enclosing_class: Option<&str>,
    visit: &mut F,
) -> GraphResult<()>
where
    F: FnMut(&'d Declaration, &str, &str, Option<&str>) -> GraphResult<()>,
{
    for decl in decls {
        let qualified = scope.qualify(decl.segment());
        visit(decl, &qualified, parent, enclosing_class)?;

        if let Declaration::Class { name, members, .. } = decl {
            scope.push(name);
            let result = walk_declarations(members, scope, &qualified, Some(name.as_str()), visit);
            scope.pop();
            result?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramModel;

    fn calls(names: &[&str]) -> Vec<CallSite> {
        names.iter().map(|n| CallSite::new(*n)).collect()
    }

    #[test]
    fn test_file_and_package_nodes() {
        let program = ProgramModel::new(vec![
            SourceUnit::new("app/A.kt", "app"),
            SourceUnit::new("app/B.kt", "app"),
        ]);
        let graph = build_graph(&program).unwrap();

        assert_eq!(graph.nodes_of_type(NodeKind::Package).count(), 1);
        assert_eq!(graph.nodes_of_type(NodeKind::File).count(), 2);
        let pkg = graph.node("app").unwrap();
        assert_eq!(graph.outgoing_edges(pkg).len(), 2);
    }

    #[test]
    fn test_root_package_name() {
        let program = ProgramModel::new(vec![SourceUnit::new("Main.kt", "")
            .with_declarations(vec![Declaration::function("main", vec![])])]);
        let graph = build_graph(&program).unwrap();

        assert!(graph.node("<root>").is_some());
        assert!(graph.node("main").is_some());
    }

    #[test]
    fn test_nested_class_enclosed_by_outer() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app").with_declarations(
            vec![Declaration::class(
                "Outer",
                vec![Declaration::class("Inner", vec![Declaration::function("run", vec![])])],
            )],
        )]);
        let graph = build_graph(&program).unwrap();

        let inner = graph.node("app.Outer.Inner").unwrap();
        assert_eq!(graph.enclosing_parent(inner).unwrap().name(), "app.Outer");
        let run = graph.node("app.Outer.Inner.run").unwrap();
        assert_eq!(run.simple_name(), "run");
        assert_eq!(graph.enclosing_parent(run).unwrap().name(), "app.Outer.Inner");
    }

    #[test]
    fn test_abstract_function_has_no_calls() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app").with_declarations(
            vec![Declaration::class("Base", vec![Declaration::abstract_function("run")])],
        )]);
        let graph = build_graph(&program).unwrap();

        let run = graph.node("app.Base.run").unwrap();
        assert!(graph.outgoing_edges(run).is_empty());
    }

    #[test]
    fn test_unresolved_calls_skipped() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app").with_declarations(
            vec![Declaration::function("main", calls(&["kotlin.io.println", "kotlin.TODO"]))],
        )]);
        let graph = build_graph(&program).unwrap();

        let main = graph.node("app.main").unwrap();
        assert!(graph.outgoing_edges(main).is_empty());
    }

    #[test]
    fn test_forward_and_cross_file_calls() {
        let program = ProgramModel::new(vec![
            SourceUnit::new("app/A.kt", "app")
                .with_declarations(vec![Declaration::function("main", calls(&["lib.util"]))]),
            SourceUnit::new("lib/U.kt", "lib")
                .with_declarations(vec![Declaration::function("util", vec![])]),
        ]);
        let graph = build_graph(&program).unwrap();

        let main = graph.node("app.main").unwrap();
        let out = graph.outgoing_edges(main);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target.name(), "lib.util");
        assert_eq!(out[0].kind, EdgeKind::Calls);
    }

    #[test]
    fn test_implicit_constructor_created_on_demand() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app").with_declarations(
            vec![
                Declaration::class("Foo", vec![]),
                Declaration::function("main", calls(&["app.Foo", "app.Foo"])),
            ],
        )]);
        let graph = build_graph(&program).unwrap();

        let ctor = graph.node("app.Foo.<init>").unwrap();
        assert!(ctor.is(NodeKind::Constructor));
        assert_eq!(ctor.simple_name(), "Foo");
        assert_eq!(graph.enclosing_parent(ctor).unwrap().name(), "app.Foo");
        // Repeated calls collapse into one edge
        assert_eq!(graph.incoming_edges(ctor).len(), 2);
    }

    #[test]
    fn test_initializer_calls() {
        let mut unit = SourceUnit::new("app/A.kt", "app").with_declarations(vec![
            Declaration::Class {
                name: "Config".to_string(),
                members: vec![],
                initializer_calls: calls(&["app.load"]),
                position: None,
            },
            Declaration::function("load", vec![]),
        ]);
        unit.initializer_calls = calls(&["app.load"]);
        let graph = build_graph(&ProgramModel::new(vec![unit])).unwrap();

        let load = graph.node("app.load").unwrap();
        let callers: Vec<_> = graph
            .incoming_edges(load)
            .iter()
            .filter(|e| e.kind == EdgeKind::Calls)
            .map(|e| e.source.name().to_string())
            .collect();
        assert_eq!(callers, vec!["app/A.kt", "app.Config"]);
    }

    #[test]
    fn test_colliding_names_fail() {
        let program = ProgramModel::new(vec![
            SourceUnit::new("app/A.kt", "app")
                .with_declarations(vec![Declaration::class("Dup", vec![])]),
            SourceUnit::new("app/B.kt", "app")
                .with_declarations(vec![Declaration::class("Dup", vec![])]),
        ]);
        let err = build_graph(&program).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode { ref name } if name == "app.Dup"));
    }

    #[test]
    fn test_overloads_collide() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app").with_declarations(
            vec![
                Declaration::function("run", vec![]),
                Declaration::function("run", vec![]),
            ],
        )]);
        assert!(matches!(
            build_graph(&program),
            Err(GraphError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn test_constructor_outside_class_rejected() {
        let program = ProgramModel::new(vec![SourceUnit::new("app/A.kt", "app")
            .with_declarations(vec![Declaration::constructor(vec![])])]);
        assert!(matches!(
            build_graph(&program),
            Err(GraphError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_package_name_clashing_with_file() {
        let program = ProgramModel::new(vec![
            SourceUnit::new("app", "lib"),
            SourceUnit::new("lib/B.kt", "app"),
        ]);
        assert!(matches!(
            build_graph(&program),
            Err(GraphError::DuplicateNode { ref name }) if name == "app"
        ));
    }

    /// Resolves every call to a package that no unit declares.
    struct PackageResolver {
        units: Vec<SourceUnit>,
    }

    impl ResolvedProgram for PackageResolver {
        fn units(&self) -> &[SourceUnit] {
            &self.units
        }

        fn resolve(&self, call: &CallSite) -> Option<ResolvedTarget> {
            Some(ResolvedTarget {
                name: call.callee.clone(),
                kind: NodeKind::Package,
                simple_name: call.callee.clone(),
                owner: None,
            })
        }
    }

    #[test]
    fn test_non_declaration_target_rejected() {
        let program = PackageResolver {
            units: vec![SourceUnit::new("app/A.kt", "app")
                .with_declarations(vec![Declaration::function("main", calls(&["ext"]))])],
        };
        let err = build_graph(&program).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument { ref message } if message.contains("'ext'")));
    }
}
