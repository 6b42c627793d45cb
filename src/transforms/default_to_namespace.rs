//! Rewrite sole default imports of `react` as namespace imports.
//!
//! `import React from "react"` becomes `import * as React from "react"`.
//! Mixed imports (`import React, { useState } from "react"`) are left
//! alone, since a namespace specifier cannot share a declaration with
//! other specifiers. Idempotent: namespace imports match nothing.

use std::path::Path;

use remold_cst::{NodeKind, SyntaxTree};

use crate::error::TransformError;

pub const NAME: &str = "default-to-namespace";

const TARGET_MODULE: &str = "react";

pub fn run(tree: &mut SyntaxTree, _path: &Path, _source: &str) -> Result<(), TransformError> {
    let decls: Vec<_> = tree
        .children(tree.root())
        .iter()
        .copied()
        .filter(|&c| matches!(tree.kind(c), NodeKind::ImportDeclaration { type_only: false }))
        .collect();

    for decl in decls {
        let children = tree.children(decl).to_vec();
        // Exactly one specifier, and it is the default one.
        let &[spec, lit] = children.as_slice() else {
            continue;
        };
        if !matches!(tree.kind(spec), NodeKind::ImportDefaultSpecifier) {
            continue;
        }
        if tree.string_value(lit) != Some(TARGET_MODULE) {
            continue;
        }

        let local = *tree
            .children(spec)
            .first()
            .ok_or_else(|| TransformError::msg("default specifier without a local binding"))?;
        let namespace = tree.alloc(NodeKind::ImportNamespaceSpecifier, vec![local]);
        tree.replace_child(decl, 0, namespace);
    }
    Ok(())
}
