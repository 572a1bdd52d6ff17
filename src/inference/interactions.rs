//! Pairwise interaction contributions.

use crate::data::RowSource;
use crate::explainability::Condition;
use crate::Parallelism;

use super::{ContributionOptions, PredictError, Predictor};

impl Predictor<'_> {
    /// Predict pairwise interaction contributions, allocating the output.
    ///
    /// The buffer covers rows `0..base_rowid + n_rows` in row-major
    /// `[row, group, column, column]` layout over attributed columns plus
    /// bias. Off-diagonal cells carry the symmetric interaction between two
    /// columns; diagonal cells carry each column's main effect, so every row
    /// of the matrix sums to that column's plain contribution and the whole
    /// matrix sums to the margin prediction.
    ///
    /// `options.condition` is ignored: conditioning is how the passes are
    /// run internally. Expect `2 * columns + 1` contribution passes.
    ///
    /// `options.approximate` carries through to every pass. The mean-value
    /// walk pays no attention to conditioning, so with it the off-diagonal
    /// cells collapse to zero and the diagonal holds each column's full
    /// approximate contribution.
    pub fn predict_interactions<R: RowSource>(
        &self,
        rows: &R,
        options: &ContributionOptions<'_>,
        parallelism: Parallelism,
    ) -> Result<Vec<f32>, PredictError> {
        let ncols_p1 = self.attribution_columns(options) + 1;
        let stride = self.n_groups() * ncols_p1 * ncols_p1;
        let n_total = rows.base_rowid() + rows.n_rows();
        let mut output = vec![0.0; n_total * stride];
        self.predict_interactions_into(rows, options, parallelism, &mut output)?;
        Ok(output)
    }

    /// Predict pairwise interaction contributions into a caller-provided
    /// buffer. See [`predict_interactions`](Self::predict_interactions).
    pub fn predict_interactions_into<R: RowSource>(
        &self,
        rows: &R,
        options: &ContributionOptions<'_>,
        parallelism: Parallelism,
        output: &mut [f32],
    ) -> Result<(), PredictError> {
        let n_groups = self.n_groups();
        let ncols_p1 = self.attribution_columns(options) + 1;
        let base = rows.base_rowid();
        let n_total = base + rows.n_rows();

        // Strides into the interaction buffer and the flat per-pass buffers.
        let row_chunk = n_groups * ncols_p1 * ncols_p1;
        let mrow_chunk = ncols_p1 * ncols_p1;
        let crow_chunk = n_groups * ncols_p1;

        let needed = n_total * row_chunk;
        if output.len() < needed {
            return Err(PredictError::OutputTooSmall {
                needed,
                got: output.len(),
            });
        }

        let mut diag = vec![0.0f32; n_total * crow_chunk];
        let mut on = vec![0.0f32; n_total * crow_chunk];
        let mut off = vec![0.0f32; n_total * crow_chunk];

        let mut pass = *options;
        pass.condition = Condition::Unconditioned;
        self.predict_contributions_into(rows, &pass, parallelism, &mut diag)?;

        for i in 0..ncols_p1 {
            pass.condition = Condition::Off(i as u32);
            self.predict_contributions_into(rows, &pass, parallelism, &mut off)?;
            pass.condition = Condition::On(i as u32);
            self.predict_contributions_into(rows, &pass, parallelism, &mut on)?;

            // Off-diagonal cells average the conditioned passes; the diagonal
            // absorbs the remainder so each matrix row sums to the plain
            // contribution of its column.
            for row in base..n_total {
                for g in 0..n_groups {
                    let o = row * row_chunk + g * mrow_chunk + i * ncols_p1;
                    let c = row * crow_chunk + g * ncols_p1;
                    output[o + i] = 0.0;
                    for k in 0..ncols_p1 {
                        if k == i {
                            output[o + i] += diag[c + k];
                        } else {
                            output[o + k] = (on[c + k] - off[c + k]) / 2.0;
                            output[o + i] -= output[o + k];
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
