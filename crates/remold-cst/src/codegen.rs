//! Format-preserving code generation.
//!
//! The printer reconciles "keep original formatting" with "print freshly
//! synthesized nodes" through a span-splice strategy, decided per node:
//!
//! 1. A clean node with a span and no mutated descendants copies its span
//!    from the original source verbatim.
//! 2. A clean node whose subtree was mutated *splices*: it copies each
//!    child's recorded lead gap (the original inter-child text) and recurses
//!    into the children, then copies its own tail gap.
//! 3. A dirty node renders canonically from its kind, with fixed spacing and
//!    the file's inferred quote style; its clean children still print
//!    verbatim through rule 1.
//!
//! Because `replace_child` transfers the outgoing child's lead gap to the
//! replacement, a single-node replacement changes the output only within the
//! replaced node's original span.

use crate::nodes::{NodeId, NodeKind, SyntaxTree};

/// Serialize the (possibly mutated) tree back to source text.
pub fn print(tree: &SyntaxTree) -> String {
    let mut out = String::with_capacity(tree.source().len());
    emit(tree, tree.root(), &mut out);
    out
}

fn emit(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    let node = tree.node(id);
    if !node.is_dirty() {
        if let Some(span) = node.span() {
            if !tree.subtree_dirty(id) {
                out.push_str(span.slice(tree.source()));
                return;
            }
            // A non-root node whose first child lost its lead gap has lost
            // the text before that child (e.g. the `import` keyword), so it
            // must be rebuilt canonically instead.
            let is_program = matches!(node.kind(), NodeKind::Program);
            let first_leadless = node
                .children()
                .first()
                .map(|&c| tree.node(c).lead.is_none())
                .unwrap_or(false);
            if is_program || !first_leadless {
                splice(tree, id, out);
                return;
            }
        }
    }
    canonical(tree, id, out);
}

/// Reassemble a clean node from its children and their original gaps.
fn splice(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    let node = tree.node(id);
    let src = tree.source();
    let children = node.children();
    let is_program = matches!(node.kind(), NodeKind::Program);

    for (idx, &child) in children.iter().enumerate() {
        let lead = tree.node(child).lead;
        match lead {
            Some(gap) => out.push_str(gap.slice(src)),
            // Inserted child: synthesize a separator from the parent kind.
            None => {
                if is_program {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                } else if idx > 0 {
                    out.push_str(", ");
                }
            }
        }
        emit(tree, child, out);
        if lead.is_none() && is_program {
            // Keep the inserted statement on its own line when anything
            // follows it.
            let needs_break = if let Some(&next) = children.get(idx + 1) {
                !tree
                    .node(next)
                    .lead
                    .map(|gap| gap.slice(src).starts_with('\n'))
                    .unwrap_or(false)
            } else {
                node.tail
                    .map(|gap| {
                        let text = gap.slice(src);
                        !text.is_empty() && !text.starts_with('\n')
                    })
                    .unwrap_or(false)
            };
            if needs_break {
                out.push('\n');
            }
        }
    }

    if let Some(tail) = node.tail {
        out.push_str(tail.slice(src));
    }
}

/// Render a node with canonical default formatting.
fn canonical(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Program => {
            let children = tree.children(id).to_vec();
            for (idx, child) in children.into_iter().enumerate() {
                if idx > 0 {
                    out.push('\n');
                }
                emit(tree, child, out);
            }
        }

        NodeKind::ImportDeclaration { type_only } => {
            out.push_str("import ");
            if *type_only {
                out.push_str("type ");
            }

            let mut named: Vec<NodeId> = Vec::new();
            let mut source_lit: Option<NodeId> = None;
            let mut attributes: Option<NodeId> = None;
            let mut wrote_specifier = false;

            for &child in tree.children(id) {
                match tree.kind(child) {
                    NodeKind::ImportDefaultSpecifier | NodeKind::ImportNamespaceSpecifier => {
                        if wrote_specifier {
                            out.push_str(", ");
                        }
                        emit(tree, child, out);
                        wrote_specifier = true;
                    }
                    NodeKind::ImportNamedSpecifier { .. } => named.push(child),
                    NodeKind::StringLiteral { .. } => source_lit = Some(child),
                    NodeKind::Raw { .. } => attributes = Some(child),
                    other => {
                        debug_assert!(false, "unexpected {} under ImportDeclaration", other.label());
                    }
                }
            }

            if !named.is_empty() {
                if wrote_specifier {
                    out.push_str(", ");
                }
                out.push_str("{ ");
                for (idx, child) in named.into_iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    emit(tree, child, out);
                }
                out.push_str(" }");
                wrote_specifier = true;
            }

            if wrote_specifier {
                out.push_str(" from ");
            }
            if let Some(lit) = source_lit {
                emit(tree, lit, out);
            }
            if let Some(attrs) = attributes {
                out.push(' ');
                emit(tree, attrs, out);
            }
            out.push(';');
        }

        NodeKind::ImportDefaultSpecifier => {
            if let Some(&local) = tree.children(id).first() {
                emit(tree, local, out);
            }
        }

        NodeKind::ImportNamespaceSpecifier => {
            out.push_str("* as ");
            if let Some(&local) = tree.children(id).first() {
                emit(tree, local, out);
            }
        }

        NodeKind::ImportNamedSpecifier { type_only } => {
            if *type_only {
                out.push_str("type ");
            }
            let children = tree.children(id).to_vec();
            if let Some(&imported) = children.first() {
                emit(tree, imported, out);
            }
            if let Some(&local) = children.get(1) {
                out.push_str(" as ");
                emit(tree, local, out);
            }
        }

        NodeKind::Identifier { name } => out.push_str(name),

        NodeKind::StringLiteral { value } => {
            let quote = tree.preferred_quote();
            out.push(quote);
            push_escaped(value, quote, out);
            out.push(quote);
        }

        NodeKind::Raw { text } => out.push_str(text),
    }
}

/// Append `value`, backslash-escaping unescaped occurrences of `quote`.
fn push_escaped(value: &str, quote: char, out: &mut String) {
    let mut escaped = false;
    for ch in value.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            out.push(ch);
            escaped = true;
            continue;
        }
        if ch == quote {
            out.push('\\');
        }
        out.push(ch);
    }
}

// ============================================================================
// Tests
// ============================================================================
