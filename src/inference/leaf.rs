//! Leaf-index extraction.

use crate::data::RowSource;
use crate::Parallelism;

use super::{resolve_tree_limit, traversal, PredictError, Predictor};

impl Predictor<'_> {
    /// Record the leaf each row lands in, per tree, allocating the output.
    ///
    /// The buffer covers rows `0..base_rowid + n_rows` in row-major
    /// `[row, tree]` layout with one column per scored tree. `ntree_limit`
    /// of 0 means all trees.
    pub fn predict_leaf<R: RowSource>(
        &self,
        rows: &R,
        ntree_limit: usize,
        parallelism: Parallelism,
    ) -> Result<Vec<u32>, PredictError> {
        let limit = resolve_tree_limit(self.forest().n_trees(), ntree_limit);
        let n_total = rows.base_rowid() + rows.n_rows();
        let mut output = vec![0u32; n_total * limit];
        self.predict_leaf_into(rows, ntree_limit, parallelism, &mut output)?;
        Ok(output)
    }

    /// Record leaf indices into a caller-provided buffer.
    ///
    /// Only the slots covering this batch's rows are written, addressed by
    /// `base_rowid + row`, so batches compose into one buffer.
    pub fn predict_leaf_into<R: RowSource>(
        &self,
        rows: &R,
        ntree_limit: usize,
        parallelism: Parallelism,
        output: &mut [u32],
    ) -> Result<(), PredictError> {
        self.check_columns(rows)?;
        let limit = resolve_tree_limit(self.forest().n_trees(), ntree_limit);

        let base = rows.base_rowid();
        let n_rows = rows.n_rows();
        let needed = (base + n_rows) * limit;
        if output.len() < needed {
            return Err(PredictError::OutputTooSmall {
                needed,
                got: output.len(),
            });
        }
        if limit == 0 || n_rows == 0 {
            return Ok(());
        }

        let region = &mut output[base * limit..needed];
        parallelism.maybe_par_bridge_for_each_init(
            region.chunks_mut(limit).enumerate(),
            || self.scratch.checkout(1),
            |slab, (row, out_row)| {
                let fvec = &mut slab[0];
                fvec.fill(rows, row);
                for t in 0..limit {
                    out_row[t] = traversal::leaf_index(self.forest().tree(t), fvec);
                }
                fvec.reset(rows, row);
            },
        );

        Ok(())
    }
}
