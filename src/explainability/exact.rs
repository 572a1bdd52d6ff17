//! Exact SHAP values over a single tree.
//!
//! Walks every root-to-leaf path once, keeping the set of unique features
//! split on so far together with their subset weights (see [`path`]). The
//! cost is polynomial in path depth instead of exponential in the feature
//! count, and the resulting attributions satisfy local accuracy: summed with
//! the bias column they reproduce the tree's margin output exactly.

use crate::inference::FeatureVector;
use crate::repr::{NodeId, Tree};

use super::path::{extend_path, unwind_path, unwound_path_sum, PathElement};
use super::{ColumnMap, Condition};

/// Accumulate one tree's exact contributions for a staged row into `phi`.
///
/// `phi` has one slot per attributed column plus a trailing bias slot.
/// `covers` and `mean_values` are per node; the caller validates that covers
/// exist before getting here.
pub(crate) fn calculate_contributions(
    tree: &Tree,
    covers: &[f32],
    mean_values: &[f32],
    fvec: &FeatureVector,
    phi: &mut [f32],
    condition: Condition,
    column_map: Option<ColumnMap<'_>>,
) {
    let n_attr_columns = phi.len() - 1;
    if condition.sign() == 0 {
        phi[n_attr_columns] += mean_values[0];
    }

    // Triangular buffer holding one path segment per recursion level.
    let maxd = tree.max_depth() + 2;
    let mut path = vec![PathElement::default(); maxd * (maxd + 1) / 2];

    let ctx = ShapContext {
        tree,
        covers,
        fvec,
        condition_sign: condition.sign(),
        condition_feature: condition.feature(),
        column_map,
    };
    ctx.recurse(phi, 0, 0, &mut path, 0, 1.0, 1.0, -1, 1.0);
}

struct ShapContext<'a> {
    tree: &'a Tree,
    covers: &'a [f32],
    fvec: &'a FeatureVector,
    condition_sign: i8,
    condition_feature: u32,
    column_map: Option<ColumnMap<'a>>,
}

impl ShapContext<'_> {
    #[inline]
    fn attributed_column(&self, feature: u32) -> u32 {
        match self.column_map {
            Some(map) => map.column_of(feature),
            None => feature,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &self,
        phi: &mut [f32],
        node: NodeId,
        unique_depth: usize,
        path: &mut [PathElement],
        parent_offset: usize,
        parent_zero_fraction: f32,
        parent_one_fraction: f32,
        parent_feature_index: i32,
        condition_fraction: f32,
    ) {
        // No weight flows here under the current condition.
        if condition_fraction == 0.0 {
            return;
        }

        let offset = parent_offset + unique_depth + 1;
        path.copy_within(parent_offset..parent_offset + unique_depth + 1, offset);

        let parent_is_conditioned = self.condition_sign != 0
            && parent_feature_index >= 0
            && self.condition_feature == self.attributed_column(parent_feature_index as u32);
        if !parent_is_conditioned {
            extend_path(
                &mut path[offset..],
                unique_depth,
                parent_zero_fraction,
                parent_one_fraction,
                parent_feature_index,
            );
        }

        if self.tree.is_leaf(node) {
            let leaf_value = self.tree.leaf_value(node);
            let seg = &path[offset..];
            for i in 1..=unique_depth {
                let w = unwound_path_sum(seg, unique_depth, i);
                let el = seg[i];
                let column = self.attributed_column(el.feature_index as u32) as usize;
                phi[column] +=
                    w * (el.one_fraction - el.zero_fraction) * leaf_value * condition_fraction;
            }
            return;
        }

        let split_index = self.tree.split_index(node);
        let left = self.tree.left_child(node);
        let right = self.tree.right_child(node);
        let hot = if self.fvec.is_missing(split_index) {
            self.tree.default_child(node)
        } else if self.fvec.value(split_index) < self.tree.split_threshold(node) {
            left
        } else {
            right
        };
        let cold = if hot == left { right } else { left };

        let w = self.covers[node as usize];
        let hot_zero_fraction = self.covers[hot as usize] / w;
        let cold_zero_fraction = self.covers[cold as usize] / w;
        let mut incoming_zero_fraction = 1.0;
        let mut incoming_one_fraction = 1.0;

        // The condition adjustments below can take the depth to -1 at the
        // root, so it is tracked signed until the recursive calls.
        let mut depth = unique_depth as isize;

        // If this feature already sits on the path, undo that split so it
        // can be redone for this node.
        {
            let seg = &mut path[offset..];
            let mut path_index = 0usize;
            while path_index <= unique_depth {
                if seg[path_index].feature_index == split_index as i32 {
                    break;
                }
                path_index += 1;
            }
            if path_index != unique_depth + 1 {
                incoming_zero_fraction = seg[path_index].zero_fraction;
                incoming_one_fraction = seg[path_index].one_fraction;
                unwind_path(seg, unique_depth, path_index);
                depth -= 1;
            }
        }

        let mut hot_condition_fraction = condition_fraction;
        let mut cold_condition_fraction = condition_fraction;
        if self.condition_sign != 0
            && self.attributed_column(split_index) == self.condition_feature
        {
            if self.condition_sign > 0 {
                cold_condition_fraction = 0.0;
            } else {
                hot_condition_fraction *= hot_zero_fraction;
                cold_condition_fraction *= cold_zero_fraction;
            }
            depth -= 1;
        }

        self.recurse(
            phi,
            hot,
            (depth + 1) as usize,
            path,
            offset,
            hot_zero_fraction * incoming_zero_fraction,
            incoming_one_fraction,
            split_index as i32,
            hot_condition_fraction,
        );
        self.recurse(
            phi,
            cold,
            (depth + 1) as usize,
            path,
            offset,
            cold_zero_fraction * incoming_zero_fraction,
            0.0,
            split_index as i32,
            cold_condition_fraction,
        );
    }
}
