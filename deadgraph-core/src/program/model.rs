//! Serde-backed resolved program.
//!
//! The JSON document lists source units with their declaration trees. Calls
//! name their callee by qualified name; resolution is a symbol-table lookup
//! over everything the units declare:
//!
//! - a declared class, function or constructor resolves to itself,
//! - a class name resolves to that class's constructor (explicit, or the
//!   implicit default constructor when the class declares none),
//! - anything else is external and resolves to `None`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{
    CallSite, DeclScope, Declaration, ResolvedProgram, ResolvedTarget, SourceUnit,
    CONSTRUCTOR_NAME,
};
use crate::common::QualifiedNameBuilder;
use crate::error::{GraphError, GraphResult, IoResultExt};
use crate::node::NodeKind;

/// On-disk shape of a resolved program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub units: Vec<SourceUnit>,
}

/// A resolved program with its symbol table.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    name: Option<String>,
    units: Vec<SourceUnit>,
    symbols: HashMap<String, ResolvedTarget>,
}

impl ProgramModel {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self::from_file(ProgramFile { name: None, units })
    }

    pub fn from_file(file: ProgramFile) -> Self {
        let symbols = index_symbols(&file.units);
        Self {
            name: file.name,
            units: file.units,
            symbols,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn to_file(&self) -> ProgramFile {
        ProgramFile {
            name: self.name.clone(),
            units: self.units.clone(),
        }
    }
}

impl ResolvedProgram for ProgramModel {
    fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    fn resolve(&self, call: &CallSite) -> Option<ResolvedTarget> {
        let target = self.symbols.get(&call.callee)?;
        match target.kind {
            NodeKind::Class => {
                let ctor = format!("{}.{}", target.name, CONSTRUCTOR_NAME);
                self.symbols.get(&ctor).cloned()
            }
            NodeKind::Function | NodeKind::Constructor => Some(target.clone()),
            NodeKind::File | NodeKind::Package => None,
        }
    }
}

/// Decode a program from JSON text. `origin` is only used for error context.
pub fn parse_program(content: &str, origin: &Path) -> GraphResult<ProgramModel> {
    let file: ProgramFile = serde_json::from_str(content).map_err(|e| {
        GraphError::program_at(origin, e.to_string(), e.line(), e.column())
    })?;
    Ok(ProgramModel::from_file(file))
}

/// Read and decode a program file.
pub fn load_program(path: &Path) -> GraphResult<ProgramModel> {
    let content = fs::read_to_string(path).with_path(path)?;
    let mut model = parse_program(&content, path)?;
    if model.name.is_none() {
        if let Some(stem) = path.file_stem() {
            model = model.with_name(stem.to_string_lossy());
        }
    }
    debug!(
        path = %path.display(),
        units = model.units.len(),
        symbols = model.symbol_count(),
        "program loaded"
    );
    Ok(model)
}

struct SymbolIndexer {
    scope: DeclScope,
    owners: Vec<String>,
    class_stack: Vec<String>,
    symbols: HashMap<String, ResolvedTarget>,
    classes: Vec<(String, String)>,
    explicit_ctors: HashSet<String>,
}

impl SymbolIndexer {
    fn insert(&mut self, name: String, kind: NodeKind, simple_name: &str) {
        let owner = self.owners.last().cloned();
        self.symbols.entry(name.clone()).or_insert(ResolvedTarget {
            name,
            kind,
            simple_name: simple_name.to_string(),
            owner,
        });
    }

    fn walk(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Class { name, members, .. } => {
                let qualified = self.scope.qualify(name);
                self.insert(qualified.clone(), NodeKind::Class, name);
                self.classes.push((qualified.clone(), name.clone()));

                self.scope.push(name);
                self.class_stack.push(qualified.clone());
                self.owners.push(qualified);
                for member in members {
                    self.walk(member);
                }
                self.owners.pop();
                self.class_stack.pop();
                self.scope.pop();
            }
            Declaration::Function { name, .. } => {
                let qualified = self.scope.qualify(name);
                self.insert(qualified, NodeKind::Function, name);
            }
            Declaration::Constructor { .. } => {
                let Some(class) = self.class_stack.last().cloned() else {
                    return;
                };
                let simple = class.rsplit('.').next().unwrap_or(&class).to_string();
                self.explicit_ctors.insert(class.clone());
                self.insert(format!("{}.{}", class, CONSTRUCTOR_NAME), NodeKind::Constructor, &simple);
            }
        }
    }

    fn add_implicit_constructors(&mut self) {
        let classes = std::mem::take(&mut self.classes);
        for (class, simple) in classes {
            if self.explicit_ctors.contains(&class) {
                continue;
            }
            let name = format!("{}.{}", class, CONSTRUCTOR_NAME);
            self.symbols.entry(name.clone()).or_insert(ResolvedTarget {
                name,
                kind: NodeKind::Constructor,
                simple_name: simple,
                owner: Some(class),
            });
        }
    }
}

fn index_symbols(units: &[SourceUnit]) -> HashMap<String, ResolvedTarget> {
    let mut indexer = SymbolIndexer {
        scope: DeclScope::default(),
        owners: Vec::new(),
        class_stack: Vec::new(),
        symbols: HashMap::new(),
        classes: Vec::new(),
        explicit_ctors: HashSet::new(),
    };

    for unit in units {
        indexer.scope = DeclScope::for_package(&unit.package);
        indexer.owners = vec![unit.path.clone()];
        for decl in &unit.declarations {
            indexer.walk(decl);
        }
    }
    indexer.add_implicit_constructors();
    indexer.symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model() -> ProgramModel {
        ProgramModel::new(vec![SourceUnit::new("test/Test.kt", "test").with_declarations(vec![
            Declaration::class(
                "Class1",
                vec![Declaration::function("funWithUnit", vec![])],
            ),
            Declaration::class(
                "WithCtor",
                vec![Declaration::constructor(vec![])],
            ),
            Declaration::function("main", vec![]),
        ])])
    }

    #[test]
    fn test_resolves_declared_function() {
        let m = model();
        let target = m.resolve(&CallSite::new("test.Class1.funWithUnit")).unwrap();
        assert_eq!(target.kind, NodeKind::Function);
        assert_eq!(target.owner.as_deref(), Some("test.Class1"));
        assert_eq!(target.simple_name, "funWithUnit");
    }

    #[test]
    fn test_top_level_owner_is_file() {
        let m = model();
        let target = m.resolve(&CallSite::new("test.main")).unwrap();
        assert_eq!(target.owner.as_deref(), Some("test/Test.kt"));
    }

    #[test]
    fn test_class_name_resolves_to_implicit_constructor() {
        let m = model();
        let target = m.resolve(&CallSite::new("test.Class1")).unwrap();
        assert_eq!(target.name, "test.Class1.<init>");
        assert_eq!(target.kind, NodeKind::Constructor);
        assert_eq!(target.simple_name, "Class1");
        assert_eq!(target.owner.as_deref(), Some("test.Class1"));
    }

    #[test]
    fn test_explicit_constructor_not_duplicated() {
        let m = model();
        let target = m.resolve(&CallSite::new("test.WithCtor")).unwrap();
        assert_eq!(target.name, "test.WithCtor.<init>");
        // Class1, Class1.<init>, Class1.funWithUnit, WithCtor, WithCtor.<init>, main
        assert_eq!(m.symbol_count(), 6);
    }

    #[test]
    fn test_external_call_unresolved() {
        let m = model();
        assert!(m.resolve(&CallSite::new("kotlin.TODO")).is_none());
        assert!(m.resolve(&CallSite::new("test/Test.kt")).is_none());
    }

    #[test]
    fn test_parse_program_error_location() {
        let err = parse_program("{ \"units\": [ }", Path::new("broken.json")).unwrap_err();
        match err {
            GraphError::Program { path, line, column, .. } => {
                assert_eq!(path, PathBuf::from("broken.json"));
                assert_eq!(line, Some(1));
                assert!(column.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_program_document() {
        let json = r#"{
            "name": "sample",
            "units": [{
                "path": "app/Main.kt",
                "package": "app",
                "declarations": [
                    { "kind": "function", "name": "main", "body": [{ "callee": "app.helper" }] },
                    { "kind": "function", "name": "helper", "body": [] }
                ]
            }]
        }"#;
        let m = parse_program(json, Path::new("sample.json")).unwrap();
        assert_eq!(m.name(), Some("sample"));
        assert_eq!(m.units().len(), 1);
        assert!(m.resolve(&CallSite::new("app.helper")).is_some());
        assert_eq!(m.to_file().units[0].declarations.len(), 2);
    }

    #[test]
    fn test_load_program_missing_file() {
        let err = load_program(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, GraphError::Io { .. }));
    }
}
