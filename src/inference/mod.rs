//! Batch inference over tree forests.
//!
//! [`Predictor`] is the entry point for everything this module does:
//! margin prediction, leaf-index extraction, and per-feature attribution
//! (contributions and interactions). All entry points share the same
//! feature-vector protocol and block orchestration, and take a
//! [`Parallelism`](crate::Parallelism) flag instead of managing threads
//! themselves.

mod contributions;
mod fvec;
mod interactions;
mod leaf;
mod predictor;
mod scratch;
pub(crate) mod traversal;

pub use contributions::ContributionOptions;
pub use fvec::FeatureVector;
pub use predictor::{Predictor, DEFAULT_BLOCK_SIZE};

use thiserror::Error;

/// Errors reported by prediction entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// The input matrix has more feature columns than the forest was built on.
    #[error("input has {actual} feature columns but the forest expects at most {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    /// The caller-provided output buffer does not cover the batch.
    #[error("output buffer too small: need {needed} values, got {got}")]
    OutputTooSmall { needed: usize, got: usize },
    /// A `tree_begin..tree_end` range does not fit the forest.
    #[error("tree range {begin}..{end} out of bounds for a forest with {n_trees} trees")]
    TreeRange {
        begin: usize,
        end: usize,
        n_trees: usize,
    },
    /// Attribution requires per-node cover statistics.
    #[error("tree {tree} has no cover statistics; contributions require covers")]
    MissingCovers { tree: usize },
    /// `tree_weights` does not provide one weight per scored tree.
    #[error("got {actual} tree weights for {expected} scored trees")]
    WeightCountMismatch { expected: usize, actual: usize },
}

/// Resolve an `ntree_limit` parameter: 0 (or anything past the end) means
/// "use all trees".
#[inline]
pub(crate) fn resolve_tree_limit(n_trees: usize, ntree_limit: usize) -> usize {
    if ntree_limit == 0 || ntree_limit > n_trees {
        n_trees
    } else {
        ntree_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_limit_zero_means_all() {
        assert_eq!(resolve_tree_limit(10, 0), 10);
        assert_eq!(resolve_tree_limit(10, 3), 3);
        assert_eq!(resolve_tree_limit(10, 10), 10);
        assert_eq!(resolve_tree_limit(10, 99), 10);
        assert_eq!(resolve_tree_limit(0, 0), 0);
    }
}
