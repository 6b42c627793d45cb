//! Transform execution against a parsed tree.
//!
//! The executor invokes a transform exactly once against the tree's root
//! and imposes no isolation: the transform may mutate any node in place,
//! and that mutation is the only channel for its effect. A failure is
//! wrapped with the transform's name and the file it was processing.

use std::path::Path;

use remold_cst::SyntaxTree;
use tracing::debug;

use crate::error::RemoldError;
use crate::registry::Transform;

/// Apply `transform` to `tree`, once.
pub fn apply(
    tree: &mut SyntaxTree,
    name: &str,
    transform: &Transform,
    path: &Path,
    original_source: &str,
) -> Result<(), RemoldError> {
    debug!(transform = name, file = %path.display(), "applying transform");
    transform(tree, path, original_source).map_err(|source| RemoldError::Transform {
        name: name.to_string(),
        file: path.display().to_string(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use remold_cst::{parse, NodeKind, ParserOptions};

    #[test]
    fn transform_mutation_is_visible_through_the_tree() {
        let mut tree = parse("import a from \"m\";\n", "t.js", &ParserOptions::default()).unwrap();
        let transform: Transform = Box::new(|tree, _path, _source| {
            let decl = tree.children(tree.root())[0];
            let lit = *tree.children(decl).last().unwrap();
            tree.set_kind(
                lit,
                NodeKind::StringLiteral {
                    value: "renamed".into(),
                },
            );
            Ok(())
        });

        apply(&mut tree, "rename-module", &transform, Path::new("t.js"), "").unwrap();
        assert_eq!(remold_cst::print(&tree), "import a from \"renamed\";\n");
    }

    #[test]
    fn transform_failure_is_wrapped_with_context() {
        let mut tree = parse("", "t.js", &ParserOptions::default()).unwrap();
        let transform: Transform =
            Box::new(|_tree, _path, _source| Err(TransformError::msg("nothing to do")));

        let err = apply(&mut tree, "broken", &transform, Path::new("src/t.js"), "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "transform 'broken' failed on src/t.js: nothing to do"
        );
    }
}
