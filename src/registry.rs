//! The transform registry: a named table of codemod entry points.
//!
//! The registry is an explicit value constructed at startup and passed into
//! the batch runner; there is no process-wide ambient table. It is read-only
//! during a run, so the runner borrows it immutably and no locking is
//! needed.
//!
//! Re-registering an existing name is a configuration error reported at
//! startup, not at lookup time.

use std::collections::BTreeMap;
use std::path::Path;

use remold_cst::SyntaxTree;

use crate::error::{RemoldError, TransformError};

/// A codemod entry point.
///
/// A transform mutates the tree it is given in place; that mutation is its
/// only output channel. Transforms must not perform file I/O — reading and
/// writing files is exclusively the batch runner's responsibility.
pub type Transform =
    Box<dyn Fn(&mut SyntaxTree, &Path, &str) -> Result<(), TransformError> + Send + Sync>;

/// A static mapping from transform name to transform function.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Transform>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform under `name`.
    ///
    /// Fails with [`RemoldError::DuplicateTransform`] when the name is
    /// already taken; nothing is overwritten silently.
    pub fn register<F>(&mut self, name: impl Into<String>, transform: F) -> Result<(), RemoldError>
    where
        F: Fn(&mut SyntaxTree, &Path, &str) -> Result<(), TransformError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.transforms.contains_key(&name) {
            return Err(RemoldError::DuplicateTransform { name });
        }
        self.transforms.insert(name, Box::new(transform));
        Ok(())
    }

    /// Look up a transform by name.
    ///
    /// The error lists every registered name, for diagnostics.
    pub fn lookup(&self, name: &str) -> Result<&Transform, RemoldError> {
        self.transforms
            .get(name)
            .ok_or_else(|| RemoldError::UnknownTransform {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// All registered names, in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    /// Number of registered transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_tree: &mut SyntaxTree, _path: &Path, _source: &str) -> Result<(), TransformError> {
        Ok(())
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TransformRegistry::new();
        registry.register("noop", noop).unwrap();

        assert!(registry.lookup("noop").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_a_configuration_error() {
        let mut registry = TransformRegistry::new();
        registry.register("noop", noop).unwrap();

        let err = registry.register("noop", noop).unwrap_err();
        assert!(matches!(err, RemoldError::DuplicateTransform { name } if name == "noop"));
    }

    #[test]
    fn unknown_lookup_enumerates_registered_names() {
        let mut registry = TransformRegistry::new();
        registry.register("alpha", noop).unwrap();
        registry.register("beta", noop).unwrap();

        let err = registry.lookup("gamma").err().unwrap();
        match err {
            RemoldError::UnknownTransform { name, known } => {
                assert_eq!(name, "gamma");
                assert_eq!(known, vec!["alpha".to_string(), "beta".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = TransformRegistry::new();
        registry.register("zeta", noop).unwrap();
        registry.register("alpha", noop).unwrap();

        assert_eq!(registry.names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
