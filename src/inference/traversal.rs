//! Tree traversal kernels.

use crate::repr::{NodeId, Tree};

use super::FeatureVector;

/// Walk a tree from the root to a leaf for one staged row.
///
/// Dispatches on whether the row has any missing slots, so the common dense
/// case runs a branch-free comparison loop with no per-node missing check.
#[inline]
pub(crate) fn leaf_index(tree: &Tree, fvec: &FeatureVector) -> NodeId {
    if fvec.has_missing() {
        walk::<true>(tree, fvec)
    } else {
        walk::<false>(tree, fvec)
    }
}

#[inline]
fn walk<const HAS_MISSING: bool>(tree: &Tree, fvec: &FeatureVector) -> NodeId {
    let mut node: NodeId = 0;
    while !tree.is_leaf(node) {
        let split = tree.split_index(node);
        if HAS_MISSING && fvec.is_missing(split) {
            node = tree.default_child(node);
        } else {
            node = if fvec.value(split) < tree.split_threshold(node) {
                tree.left_child(node)
            } else {
                tree.right_child(node)
            };
        }
    }
    node
}

/// Single traversal step, used by the attribution walks.
#[inline]
pub(crate) fn next_node(tree: &Tree, node: NodeId, fvec: &FeatureVector) -> NodeId {
    let split = tree.split_index(node);
    if fvec.is_missing(split) {
        tree.default_child(node)
    } else if fvec.value(split) < tree.split_threshold(node) {
        tree.left_child(node)
    } else {
        tree.right_child(node)
    }
}
