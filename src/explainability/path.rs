//! Decision-path bookkeeping for the exact attribution recursion.
//!
//! A path is the list of unique features split on between the root and the
//! current node, each with the fraction of subsets that flow down when the
//! feature is excluded (`zero_fraction`) or included (`one_fraction`).
//! `pweight` carries the permutation weight of each subset size. The three
//! operations below are the incremental updates the recursion is built on.

/// One unique feature on the current decision path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathElement {
    /// Raw split feature, or -1 for the root marker element.
    pub feature_index: i32,
    /// Fraction of subsets flowing down this branch when the feature is out.
    pub zero_fraction: f32,
    /// 1.0 while the row follows this branch, 0.0 on cold branches.
    pub one_fraction: f32,
    /// Permutation weight of subsets of this size.
    pub pweight: f32,
}

impl Default for PathElement {
    fn default() -> Self {
        Self {
            feature_index: -1,
            zero_fraction: 0.0,
            one_fraction: 0.0,
            pweight: 0.0,
        }
    }
}

/// Grow the path by one feature, updating all subset weights.
pub(crate) fn extend_path(
    path: &mut [PathElement],
    unique_depth: usize,
    zero_fraction: f32,
    one_fraction: f32,
    feature_index: i32,
) {
    path[unique_depth] = PathElement {
        feature_index,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    };
    let d = unique_depth as f32;
    for i in (0..unique_depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i as f32 + 1.0) / (d + 1.0);
        path[i].pweight = zero_fraction * path[i].pweight * (d - i as f32) / (d + 1.0);
    }
}

/// Remove the feature at `path_index`, restoring the weights to what they
/// would have been had it never been added.
pub(crate) fn unwind_path(path: &mut [PathElement], unique_depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let d = unique_depth as f32;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * (d + 1.0) / ((i as f32 + 1.0) * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (d - i as f32) / (d + 1.0);
        } else {
            path[i].pweight = (path[i].pweight * (d + 1.0)) / (zero_fraction * (d - i as f32));
        }
    }

    for i in path_index..unique_depth {
        path[i].feature_index = path[i + 1].feature_index;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight the path would have with the feature at
/// `path_index` unwound, without mutating the path.
pub(crate) fn unwound_path_sum(
    path: &[PathElement],
    unique_depth: usize,
    path_index: usize,
) -> f32 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0f32;
    let d = unique_depth as f32;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * (d + 1.0) / ((i as f32 + 1.0) * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * ((d - i as f32) / (d + 1.0));
        } else if zero_fraction != 0.0 {
            total += (path[i].pweight / zero_fraction) / ((d - i as f32) / (d + 1.0));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fresh_path(len: usize) -> Vec<PathElement> {
        vec![PathElement::default(); len]
    }

    #[test]
    fn extend_sets_unit_weight_at_root() {
        let mut path = fresh_path(4);
        extend_path(&mut path, 0, 1.0, 1.0, -1);
        assert_eq!(path[0].pweight, 1.0);
        assert_eq!(path[0].feature_index, -1);
    }

    #[test]
    fn unwind_inverts_extend() {
        // Build root + two features, unwind the first feature, and compare
        // against a path that never contained it.
        let mut path = fresh_path(4);
        extend_path(&mut path, 0, 1.0, 1.0, -1);
        extend_path(&mut path, 1, 0.5, 1.0, 0);
        extend_path(&mut path, 2, 0.25, 0.0, 1);
        unwind_path(&mut path, 2, 1);

        let mut expected = fresh_path(4);
        extend_path(&mut expected, 0, 1.0, 1.0, -1);
        extend_path(&mut expected, 1, 0.25, 0.0, 1);

        for i in 0..2 {
            assert_eq!(path[i].feature_index, expected[i].feature_index);
            assert_abs_diff_eq!(path[i].pweight, expected[i].pweight, epsilon = 1e-6);
            assert_abs_diff_eq!(path[i].zero_fraction, expected[i].zero_fraction, epsilon = 1e-6);
            assert_abs_diff_eq!(path[i].one_fraction, expected[i].one_fraction, epsilon = 1e-6);
        }
    }

    #[test]
    fn unwound_sum_matches_destructive_unwind() {
        let mut path = fresh_path(4);
        extend_path(&mut path, 0, 1.0, 1.0, -1);
        extend_path(&mut path, 1, 0.5, 1.0, 0);
        extend_path(&mut path, 2, 0.4, 0.0, 1);

        let sum = unwound_path_sum(&path, 2, 1);

        let mut unwound = path.clone();
        unwind_path(&mut unwound, 2, 1);
        let direct: f32 = (0..2).map(|i| unwound[i].pweight).sum();
        assert_abs_diff_eq!(sum, direct, epsilon = 1e-6);
    }
}
