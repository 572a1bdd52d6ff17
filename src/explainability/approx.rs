//! Approximate contributions via node mean values.
//!
//! Instead of averaging over all decision paths, this walks only the path
//! the row actually takes and credits each split with the change in the
//! cover-weighted mean prediction between its node and the chosen child.
//! One traversal per tree, at the price of attribution that depends on split
//! order.

use crate::inference::{traversal, FeatureVector};
use crate::repr::{NodeId, Tree};

use super::ColumnMap;

/// Cover-weighted mean prediction below every node.
///
/// Leaves carry their value; an internal node carries the mean of its
/// children weighted by cover. These are also the bias terms of the exact
/// recursion, so one precompute serves both attribution modes.
pub(crate) fn node_mean_values(tree: &Tree, covers: &[f32]) -> Box<[f32]> {
    let mut means = vec![0.0f32; tree.n_nodes()];
    fill_mean(tree, covers, 0, &mut means);
    means.into_boxed_slice()
}

fn fill_mean(tree: &Tree, covers: &[f32], node: NodeId, means: &mut [f32]) -> f32 {
    let value = if tree.is_leaf(node) {
        tree.leaf_value(node)
    } else {
        let left = tree.left_child(node);
        let right = tree.right_child(node);
        let left_mean = fill_mean(tree, covers, left, means);
        let right_mean = fill_mean(tree, covers, right, means);
        (covers[left as usize] * left_mean + covers[right as usize] * right_mean)
            / covers[node as usize]
    };
    means[node as usize] = value;
    value
}

/// Accumulate one tree's approximate contributions for a staged row.
///
/// `phi` has one slot per attributed column plus a trailing bias slot.
pub(crate) fn calculate_contributions_approx(
    tree: &Tree,
    mean_values: &[f32],
    fvec: &FeatureVector,
    phi: &mut [f32],
    column_map: Option<ColumnMap<'_>>,
) {
    let n_attr_columns = phi.len() - 1;
    phi[n_attr_columns] += mean_values[0];

    let mut node: NodeId = 0;
    let mut node_value = mean_values[0];
    while !tree.is_leaf(node) {
        let split = tree.split_index(node);
        let column = match column_map {
            Some(map) => map.column_of(split),
            None => split,
        } as usize;
        node = traversal::next_node(tree, node, fvec);
        let next_value = mean_values[node as usize];
        phi[column] += next_value - node_value;
        node_value = next_value;
    }
}
