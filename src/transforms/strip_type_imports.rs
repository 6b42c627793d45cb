//! Remove TypeScript type-only imports.
//!
//! `import type { Props } from "./types";` declarations are deleted
//! outright. Inside value imports, `{ type A }` specifiers are removed;
//! a declaration whose specifiers were all type-only is deleted too,
//! rather than left as an empty (and now side-effecting) import.
//!
//! Requires the `typescript` syntax extension, since without it the
//! parser never produces type-only nodes; on plain sources this is a
//! no-op.

use std::path::Path;

use remold_cst::{NodeId, NodeKind, SyntaxTree};

use crate::error::TransformError;

pub const NAME: &str = "strip-type-imports";

pub fn run(tree: &mut SyntaxTree, _path: &Path, _source: &str) -> Result<(), TransformError> {
    let root = tree.root();
    let top_level = tree.children(root).to_vec();

    // Reverse order so earlier indices stay valid across removals.
    for (index, &decl) in top_level.iter().enumerate().rev() {
        let NodeKind::ImportDeclaration { type_only } = *tree.kind(decl) else {
            continue;
        };
        if type_only || strip_specifiers(tree, decl) {
            tree.remove_child(root, index);
        }
    }
    Ok(())
}

/// Drop type-only named specifiers from a value import. Returns true when
/// the declaration had specifiers and lost all of them.
fn strip_specifiers(tree: &mut SyntaxTree, decl: NodeId) -> bool {
    let children = tree.children(decl).to_vec();
    let mut type_indices = Vec::new();
    let mut named_kept = 0usize;
    let mut other_specs = 0usize;

    for (index, &child) in children.iter().enumerate() {
        match tree.kind(child) {
            NodeKind::ImportNamedSpecifier { type_only: true } => type_indices.push(index),
            NodeKind::ImportNamedSpecifier { type_only: false } => named_kept += 1,
            NodeKind::ImportDefaultSpecifier | NodeKind::ImportNamespaceSpecifier => {
                other_specs += 1;
            }
            _ => {}
        }
    }

    if type_indices.is_empty() {
        return false;
    }
    if named_kept == 0 && other_specs == 0 {
        return true;
    }

    for index in type_indices.into_iter().rev() {
        tree.remove_child(decl, index);
    }
    // When a default or namespace specifier sits before the brace group, or
    // the brace group emptied out, the recorded gaps can no longer reproduce
    // the braces; rebuild the declaration canonically instead.
    if other_specs > 0 || named_kept == 0 {
        tree.mark_dirty(decl);
    }
    false
}
