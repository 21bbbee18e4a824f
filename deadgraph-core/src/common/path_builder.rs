//! Qualified-name construction for declarations.
//!
//! Names are dotted paths (`package.Outer.Inner.member`). The empty package
//! contributes no prefix.

/// Trait for building qualified names from a lexical scope stack.
///
/// Implement this on walkers that track the enclosing package and classes.
pub trait QualifiedNameBuilder {
    /// Returns the current scope components, outermost first.
    fn current_scope(&self) -> &[String];

    /// Appends `name` to the current scope.
    ///
    /// # Example
    /// If `current_scope()` returns `["test", "Class1"]` and `name` is
    /// `"funWithUnit"`, this returns `"test.Class1.funWithUnit"`.
    fn qualify(&self, name: &str) -> String {
        let prefix = join_segments(self.current_scope());
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    }
}

/// Joins non-empty segments with `.`.
pub fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(".")
}
