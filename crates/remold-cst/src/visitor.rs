//! Depth-first traversal sugar over the node arena.
//!
//! The tree itself only exposes raw child iteration; transforms that want a
//! whole-tree walk use these helpers. Because mutation invalidates borrows,
//! the usual pattern is: collect the interesting `NodeId`s first, then
//! mutate.

use crate::nodes::{NodeId, SyntaxTree};

/// Visitor over nodes in pre-order.
pub trait Visit {
    /// Called for each node. Return `false` to skip the node's children.
    fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) -> bool;
}

/// Walk the subtree rooted at `id` in pre-order, driving `visitor`.
pub fn walk<V: Visit>(tree: &SyntaxTree, id: NodeId, visitor: &mut V) {
    if !visitor.visit_node(tree, id) {
        return;
    }
    for &child in tree.children(id) {
        walk(tree, child, visitor);
    }
}

/// All nodes of the subtree rooted at `id`, in pre-order.
pub fn pre_order(tree: &SyntaxTree, id: NodeId) -> Vec<NodeId> {
    struct Collect(Vec<NodeId>);
    impl Visit for Collect {
        fn visit_node(&mut self, _tree: &SyntaxTree, id: NodeId) -> bool {
            self.0.push(id);
            true
        }
    }
    let mut collector = Collect(Vec::new());
    walk(tree, id, &mut collector);
    collector.0
}

// ============================================================================
// Tests
// ============================================================================
