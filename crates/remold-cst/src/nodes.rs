//! Arena-backed lossless syntax tree.
//!
//! # Node identity and mutation tracking
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Each slot carries:
//!
//! - a [`NodeKind`] tag (closed sum type, one variant per node kind),
//! - a child list of `NodeId`s,
//! - the node's original [`Span`] (`None` for synthesized nodes),
//! - a `lead` span: the original source text between the previous sibling
//!   (or the parent's start) and this node, and
//! - a `dirty` flag set by any mutation of the node itself.
//!
//! The printer decides format preservation by checking the flag and the
//! spans: clean spanned subtrees are copied verbatim, dirty nodes are
//! rendered canonically. Mutation goes through the tree's explicit API
//! (`replace_child`, `insert_child`, `remove_child`, `set_kind`), which is
//! the only channel by which a transform communicates its effect.
//!
//! NodeIds are assigned in allocation order and are stable for the life of
//! the tree; removed nodes stay in the arena but become unreachable. A tree
//! is created once per file, mutated by one transform invocation, printed
//! once, and discarded.

use crate::span::Span;
use std::fmt;

// ============================================================================
// Node Identity
// ============================================================================

/// A stable identifier for a node in a [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId with the given value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ============================================================================
// Node Kinds
// ============================================================================

/// The closed set of node kinds.
///
/// Adding a node kind means adding a variant here and a canonical rendering
/// arm in the code generator; there are no open-ended type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root node; children are top-level statements.
    Program,
    /// An import declaration; children are specifiers followed by the
    /// source string literal (and, optionally, a trailing attributes blob).
    ImportDeclaration {
        /// TypeScript `import type` declaration.
        type_only: bool,
    },
    /// Default-import specifier; single child is the local [`NodeKind::Identifier`].
    ImportDefaultSpecifier,
    /// Namespace specifier (`* as ns`); single child is the local identifier.
    ImportNamespaceSpecifier,
    /// Named specifier (`a` or `a as b`); children are the imported
    /// identifier and, when aliased, the local identifier.
    ImportNamedSpecifier {
        /// TypeScript `{ type A }` specifier.
        type_only: bool,
    },
    /// An identifier leaf.
    Identifier { name: String },
    /// A string literal leaf; `value` is the text between the quotes.
    StringLiteral { value: String },
    /// An opaque run of source the parser does not model structurally.
    Raw { text: String },
}

impl NodeKind {
    /// Short tag name, used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ImportDefaultSpecifier => "ImportDefaultSpecifier",
            NodeKind::ImportNamespaceSpecifier => "ImportNamespaceSpecifier",
            NodeKind::ImportNamedSpecifier { .. } => "ImportNamedSpecifier",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::Raw { .. } => "Raw",
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) span: Option<Span>,
    pub(crate) lead: Option<Span>,
    pub(crate) tail: Option<Span>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) dirty: bool,
    /// Child list was edited; the node's own formatting survives but its
    /// span can no longer be copied wholesale.
    pub(crate) spliced: bool,
}

impl Node {
    /// The node's kind tag.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's original span, if it originated from the parse.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// The node's children, in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node itself has been mutated (or was synthesized).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// ============================================================================
// Syntax Tree
// ============================================================================

/// A parsed source file: the original text plus the node arena.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    path: String,
    nodes: Vec<Node>,
    root: NodeId,
    preferred_quote: char,
}

impl SyntaxTree {
    /// Create a tree containing only an empty `Program` root.
    ///
    /// Used by the parser, which then fills in children and spans.
    pub(crate) fn build(source: String, path: String) -> Self {
        let root_node = Node {
            kind: NodeKind::Program,
            span: Some(Span::new(0, source.len())),
            lead: None,
            tail: None,
            children: Vec::new(),
            dirty: false,
            spliced: false,
        };
        SyntaxTree {
            source,
            path,
            nodes: vec![root_node],
            root: NodeId::new(0),
            preferred_quote: '"',
        }
    }

    /// Allocate a node that originated from the parse (clean, spanned).
    pub(crate) fn alloc_parsed(&mut self, kind: NodeKind, span: Span, lead: Span) -> NodeId {
        self.push(Node {
            kind,
            span: Some(span),
            lead: Some(lead),
            tail: None,
            children: Vec::new(),
            dirty: false,
            spliced: false,
        })
    }

    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.nodes[id.index()].children = children;
    }

    pub(crate) fn set_tail(&mut self, id: NodeId, tail: Span) {
        self.nodes[id.index()].tail = Some(tail);
    }

    pub(crate) fn set_preferred_quote(&mut self, quote: char) {
        self.preferred_quote = quote;
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// The root `Program` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The path the source was parsed from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Quote character used when rendering synthesized string literals,
    /// inferred from the first string literal in the file.
    pub fn preferred_quote(&self) -> char {
        self.preferred_quote
    }

    /// Borrow a node. Panics if `id` is not from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The node's kind tag.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// The node's children, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The node's original source text, if it originated from the parse.
    pub fn original_text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index()].span.map(|s| s.slice(&self.source))
    }

    /// The identifier name, when the node is an [`NodeKind::Identifier`].
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// The literal value, when the node is a [`NodeKind::StringLiteral`].
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::StringLiteral { value } => Some(value),
            _ => None,
        }
    }

    /// Whether the node or any of its descendants has been mutated.
    pub fn subtree_dirty(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.index()];
        node.dirty || node.spliced || node.children.iter().any(|&c| self.subtree_dirty(c))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Allocate a synthesized node. It has no original span and is marked
    /// dirty, so the printer renders it canonically.
    pub fn alloc(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        self.push(Node {
            kind,
            span: None,
            lead: None,
            tail: None,
            children,
            dirty: true,
            spliced: false,
        })
    }

    /// Replace the node's kind tag in place, marking it dirty.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.dirty = true;
    }

    /// Mark a node dirty without changing it, forcing canonical rendering.
    pub fn mark_dirty(&mut self, id: NodeId) {
        self.nodes[id.index()].dirty = true;
    }

    /// Replace the child at `index` in `parent`'s child list.
    ///
    /// The outgoing child's lead gap transfers to the replacement, so the
    /// printed output differs from the original only within the replaced
    /// child's span. Returns the replaced child's id. Panics if `index` is
    /// out of bounds.
    pub fn replace_child(&mut self, parent: NodeId, index: usize, new_child: NodeId) -> NodeId {
        let old = self.nodes[parent.index()].children[index];
        let old_lead = self.nodes[old.index()].lead;
        self.nodes[new_child.index()].lead = old_lead;
        self.nodes[parent.index()].children[index] = new_child;
        self.nodes[parent.index()].spliced = true;
        old
    }

    /// Insert a child at `index` in `parent`'s child list.
    ///
    /// The inserted node keeps no lead gap; the printer synthesizes a
    /// separator from the parent's kind. Panics if `index > len`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[parent.index()].spliced = true;
    }

    /// Remove and return the child at `index` in `parent`'s child list.
    ///
    /// The removed child's text and its separating gap both disappear from
    /// the printed output. Panics if `index` is out of bounds.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> NodeId {
        let removed = self.nodes[parent.index()].children.remove(index);
        self.nodes[parent.index()].spliced = true;
        // When the first child goes, the next child takes over its lead gap
        // so the separator that followed the removed child disappears.
        if index == 0 {
            if let Some(&next) = self.nodes[parent.index()].children.first() {
                let removed_lead = self.nodes[removed.index()].lead;
                self.nodes[next.index()].lead = removed_lead;
            }
        }
        removed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_tree() -> SyntaxTree {
        // "ab" with two raw children covering "a" and "b".
        let mut tree = SyntaxTree::build("ab".to_string(), "test.js".to_string());
        let a = tree.alloc_parsed(
            NodeKind::Raw { text: "a".into() },
            Span::new(0, 1),
            Span::empty(0),
        );
        let b = tree.alloc_parsed(
            NodeKind::Raw { text: "b".into() },
            Span::new(1, 2),
            Span::empty(1),
        );
        let root = tree.root();
        tree.set_children(root, vec![a, b]);
        tree.set_tail(root, Span::empty(2));
        tree
    }

    mod arena_basics {
        use super::*;

        #[test]
        fn parsed_nodes_are_clean() {
            let tree = leaf_tree();
            let root = tree.root();
            assert!(!tree.subtree_dirty(root));
            for &child in tree.children(root) {
                assert!(!tree.node(child).is_dirty());
                assert!(tree.node(child).span().is_some());
            }
        }

        #[test]
        fn synthesized_nodes_are_dirty_and_spanless() {
            let mut tree = leaf_tree();
            let id = tree.alloc(
                NodeKind::Identifier { name: "x".into() },
                vec![],
            );
            assert!(tree.node(id).is_dirty());
            assert!(tree.node(id).span().is_none());
        }

        #[test]
        fn set_kind_marks_dirty() {
            let mut tree = leaf_tree();
            let first = tree.children(tree.root())[0];
            tree.set_kind(first, NodeKind::Raw { text: "z".into() });
            assert!(tree.node(first).is_dirty());
            assert!(tree.subtree_dirty(tree.root()));
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn replace_child_transfers_lead() {
            let mut tree = leaf_tree();
            let root = tree.root();
            let old_first = tree.children(root)[0];
            let old_lead = tree.node(old_first).lead;

            let new = tree.alloc(NodeKind::Raw { text: "q".into() }, vec![]);
            let replaced = tree.replace_child(root, 0, new);

            assert_eq!(replaced, old_first);
            assert_eq!(tree.children(root)[0], new);
            assert_eq!(tree.node(new).lead, old_lead);
        }

        #[test]
        fn remove_first_child_transfers_lead_to_next() {
            let mut tree = leaf_tree();
            let root = tree.root();
            let first = tree.children(root)[0];
            let first_lead = tree.node(first).lead;

            tree.remove_child(root, 0);

            let new_first = tree.children(root)[0];
            assert_eq!(tree.node(new_first).lead, first_lead);
        }

        #[test]
        fn insert_child_has_no_lead() {
            let mut tree = leaf_tree();
            let root = tree.root();
            let new = tree.alloc(NodeKind::Raw { text: "m".into() }, vec![]);
            tree.insert_child(root, 1, new);

            assert_eq!(tree.children(root).len(), 3);
            assert_eq!(tree.children(root)[1], new);
            assert!(tree.node(new).lead.is_none());
        }

        #[test]
        fn removed_nodes_stay_in_arena_but_unreachable() {
            let mut tree = leaf_tree();
            let root = tree.root();
            let removed = tree.remove_child(root, 1);

            // Still addressable, no longer a child.
            assert_eq!(tree.kind(removed).label(), "Raw");
            assert!(!tree.children(root).contains(&removed));
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn identifier_and_string_helpers() {
            let mut tree = leaf_tree();
            let ident = tree.alloc(NodeKind::Identifier { name: "React".into() }, vec![]);
            let lit = tree.alloc(NodeKind::StringLiteral { value: "react".into() }, vec![]);

            assert_eq!(tree.identifier_name(ident), Some("React"));
            assert_eq!(tree.string_value(lit), Some("react"));
            assert_eq!(tree.identifier_name(lit), None);
        }

        #[test]
        fn original_text_slices_span() {
            let tree = leaf_tree();
            let first = tree.children(tree.root())[0];
            assert_eq!(tree.original_text(first), Some("a"));
        }
    }
}
