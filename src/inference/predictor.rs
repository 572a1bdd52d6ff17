//! Block-based batch prediction.
//!
//! # Usage
//!
//! ```ignore
//! use leafcast::data::DenseRows;
//! use leafcast::{Parallelism, Predictor};
//!
//! let predictor = Predictor::new(&forest);
//! let rows = DenseRows::new(&values, n_rows, n_cols);
//! let margins = predictor.predict(&rows, 0, 0, Parallelism::Parallel)?;
//! ```
//!
//! # Block Size
//!
//! Rows are processed in fixed-size blocks for cache efficiency: each block
//! is staged into feature vectors once, every tree of the range runs over the
//! whole block, then the vectors are un-filled for the next block. The
//! default block size is 64 rows; use [`Predictor::with_block_size`] to
//! customize.

use crate::data::RowSource;
use crate::repr::Forest;
use crate::Parallelism;

use super::scratch::FVecPool;
use super::{resolve_tree_limit, traversal, PredictError};

/// Default number of rows staged per block.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Batch predictor over a [`Forest`].
///
/// Owns the scratch space reused across calls; the forest itself is borrowed
/// and never mutated, so one predictor can serve many threads at once.
#[derive(Debug)]
pub struct Predictor<'f> {
    forest: &'f Forest,
    block_size: usize,
    pub(super) scratch: FVecPool,
}

impl<'f> Predictor<'f> {
    /// Create a predictor for the given forest.
    #[inline]
    pub fn new(forest: &'f Forest) -> Self {
        Self {
            forest,
            block_size: DEFAULT_BLOCK_SIZE,
            scratch: FVecPool::new(forest.n_features()),
        }
    }

    /// Create a predictor with a custom block size.
    #[inline]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        self.block_size = block_size;
        self
    }

    /// Get the block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Get a reference to the underlying forest.
    #[inline]
    pub fn forest(&self) -> &'f Forest {
        self.forest
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.forest.n_groups() as usize
    }

    /// Predict the margin for a single row given as sparse entries.
    ///
    /// Entry feature indices must be unique and in range for the forest.
    /// `ntree_limit` of 0 means all trees.
    pub fn predict_row(&self, entries: &[(u32, f32)], ntree_limit: usize) -> Vec<f32> {
        let limit = resolve_tree_limit(self.forest.n_trees(), ntree_limit);
        let mut output = vec![self.forest.base_score(); self.n_groups()];

        let mut slab = self.scratch.checkout(1);
        let fvec = &mut slab[0];
        for &(feature, value) in entries {
            fvec.set(feature, value);
        }

        for t in 0..limit {
            let tree = self.forest.tree(t);
            let leaf = traversal::leaf_index(tree, fvec);
            output[self.forest.tree_group(t) as usize] += tree.leaf_value(leaf);
        }

        for &(feature, _) in entries {
            fvec.unset(feature);
        }
        output
    }

    /// Predict margins for a batch, allocating the output buffer.
    ///
    /// The buffer covers rows `0..base_rowid + n_rows` in row-major
    /// `[row, group]` layout; rows before `base_rowid` are left at zero.
    /// `tree_end` of 0 means all trees.
    pub fn predict<R: RowSource>(
        &self,
        rows: &R,
        tree_begin: usize,
        tree_end: usize,
        parallelism: Parallelism,
    ) -> Result<Vec<f32>, PredictError> {
        let n_total = rows.base_rowid() + rows.n_rows();
        let mut output = vec![0.0; n_total * self.n_groups()];
        self.predict_into(rows, None, tree_begin, tree_end, parallelism, &mut output)?;
        Ok(output)
    }

    /// Predict margins for a batch into a caller-provided buffer.
    ///
    /// Only the region covering this batch's rows is written: the slots
    /// `[base_rowid * n_groups, (base_rowid + n_rows) * n_groups)` are seeded
    /// from `base_margin` (or the forest base score) and accumulated into.
    /// Predicting a large matrix batch by batch therefore composes into the
    /// same buffer as one big call.
    ///
    /// A `base_margin` whose length is not `(base_rowid + n_rows) * n_groups`
    /// is ignored with a warning and the base score is used instead.
    pub fn predict_into<R: RowSource>(
        &self,
        rows: &R,
        base_margin: Option<&[f32]>,
        tree_begin: usize,
        tree_end: usize,
        parallelism: Parallelism,
        output: &mut [f32],
    ) -> Result<(), PredictError> {
        self.check_columns(rows)?;
        let (tree_begin, tree_end) = self.resolve_tree_range(tree_begin, tree_end)?;

        let n_groups = self.n_groups();
        let base = rows.base_rowid();
        let n_rows = rows.n_rows();
        let needed = (base + n_rows) * n_groups;
        if output.len() < needed {
            return Err(PredictError::OutputTooSmall {
                needed,
                got: output.len(),
            });
        }

        let margin = validated_margin(base_margin, needed, n_groups);
        let region = &mut output[base * n_groups..needed];
        match margin {
            Some(m) => region.copy_from_slice(&m[base * n_groups..needed]),
            None => region.fill(self.forest.base_score()),
        }

        if n_rows == 0 {
            return Ok(());
        }

        let block = self.block_size;
        parallelism.maybe_par_bridge_for_each_init(
            region.chunks_mut(block * n_groups).enumerate(),
            || self.scratch.checkout(block),
            |slab, (block_idx, out_block)| {
                let first_row = block_idx * block;
                let rows_in_block = out_block.len() / n_groups;

                for i in 0..rows_in_block {
                    slab[i].fill(rows, first_row + i);
                }

                // Tree-outer, row-inner: each tree's nodes stay hot while the
                // whole block passes through it.
                for t in tree_begin..tree_end {
                    let tree = self.forest.tree(t);
                    let group = self.forest.tree_group(t) as usize;
                    for i in 0..rows_in_block {
                        let leaf = traversal::leaf_index(tree, &slab[i]);
                        out_block[i * n_groups + group] += tree.leaf_value(leaf);
                    }
                }

                for i in 0..rows_in_block {
                    slab[i].reset(rows, first_row + i);
                }
            },
        );

        Ok(())
    }

    pub(super) fn check_columns<R: RowSource>(&self, rows: &R) -> Result<(), PredictError> {
        if rows.n_columns() > self.forest.n_features() {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.forest.n_features(),
                actual: rows.n_columns(),
            });
        }
        Ok(())
    }

    fn resolve_tree_range(
        &self,
        tree_begin: usize,
        tree_end: usize,
    ) -> Result<(usize, usize), PredictError> {
        let n_trees = self.forest.n_trees();
        let end = if tree_end == 0 { n_trees } else { tree_end };
        if tree_begin > end || end > n_trees {
            return Err(PredictError::TreeRange {
                begin: tree_begin,
                end,
                n_trees,
            });
        }
        Ok((tree_begin, end))
    }
}

/// Check a base margin against the expected buffer length.
///
/// A mismatched margin is dropped with a warning that spells out the length
/// the caller should have provided.
pub(super) fn validated_margin<'a>(
    base_margin: Option<&'a [f32]>,
    expected: usize,
    n_groups: usize,
) -> Option<&'a [f32]> {
    match base_margin {
        Some(m) if m.len() == expected => Some(m),
        Some(m) => {
            log::warn!(
                "ignoring base margin of length {}: expected {} ({} rows x {} groups)",
                m.len(),
                expected,
                expected / n_groups,
                n_groups
            );
            None
        }
        None => None,
    }
}
