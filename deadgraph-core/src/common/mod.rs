//! Common utilities shared across the graph layers.

mod graph_trait;
mod path_builder;

pub use graph_trait::GraphTraversal;
pub use path_builder::{join_segments, QualifiedNameBuilder};
