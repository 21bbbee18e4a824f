//! Typed error handling for deadgraph.
//!
//! Structural errors (`DuplicateNode`, `UnknownNode`, `DuplicateParent`) come
//! from the graph store and surface through the graph builder. The remaining
//! variants belong to the loading layers around the core.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadgraph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Two nodes were registered under the same qualified name.
    #[error("Duplicate node: '{name}' is already registered in this graph")]
    DuplicateNode { name: String },

    /// An edge endpoint was never added to the store.
    #[error("Unknown node: '{name}' is not present in this graph")]
    UnknownNode { name: String },

    /// A node was given a second enclosing parent.
    #[error("Node '{name}' is already enclosed by '{existing}', cannot also be enclosed by '{requested}'")]
    DuplicateParent {
        name: String,
        existing: String,
        requested: String,
    },

    /// I/O error when reading a program file
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A resolved-program file could not be decoded
    #[error("Program error in {path}: {message}")]
    Program {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) if available
        line: Option<usize>,
        /// Column number (1-indexed) if available
        column: Option<usize>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl GraphError {
    pub fn duplicate_node(name: impl Into<String>) -> Self {
        Self::DuplicateNode { name: name.into() }
    }

    pub fn unknown_node(name: impl Into<String>) -> Self {
        Self::UnknownNode { name: name.into() }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a program decode error with line/column info.
    pub fn program_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Program {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this error only affects one program (the caller may skip it
    /// and continue with the others).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Program { .. } | Self::Config { .. })
    }
}

/// Convenience type alias for deadgraph results.
pub type GraphResult<T> = Result<T, GraphError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> GraphResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> GraphResult<T> {
        self.map_err(|e| GraphError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = GraphError::io(
            PathBuf::from("/test/program.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, GraphError::Io { .. }));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/test/program.json"));
    }

    #[test]
    fn test_program_error_with_location() {
        let err = GraphError::program_at("/p.json", "expected value", 10, 5);
        if let GraphError::Program { line, column, .. } = &err {
            assert_eq!(*line, Some(10));
            assert_eq!(*column, Some(5));
        } else {
            panic!("Expected Program error");
        }
    }

    #[test]
    fn test_structural_errors() {
        let dup = GraphError::duplicate_node("test.Class1");
        assert!(!dup.is_recoverable());
        assert!(dup.to_string().contains("test.Class1"));

        let unknown = GraphError::unknown_node("test.missing");
        assert!(!unknown.is_recoverable());
        assert!(unknown.to_string().contains("test.missing"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(GraphError::program_at("/p.json", "error", 1, 1).is_recoverable());
        assert!(GraphError::config("/deadgraph.toml", "bad").is_recoverable());
        assert!(!GraphError::invalid_argument("empty root").is_recoverable());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let mapped = result.with_path("/missing/program.json");
        assert!(matches!(mapped, Err(GraphError::Io { .. })));
    }
}
