//! Per-feature contribution prediction.

use crate::data::RowSource;
use crate::explainability::{approx, exact, ColumnMap, Condition};
use crate::Parallelism;

use super::predictor::validated_margin;
use super::{resolve_tree_limit, PredictError, Predictor};

/// Options for contribution and interaction prediction.
///
/// The defaults score all trees, exactly, over raw feature columns with no
/// conditioning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContributionOptions<'a> {
    /// Number of trees to score; 0 means all.
    pub ntree_limit: usize,
    /// Per-tree scale applied to each tree's contribution vector. Must have
    /// one entry per scored tree (the resolved `ntree_limit`).
    pub tree_weights: Option<&'a [f32]>,
    /// Use the fast mean-value walk instead of the exact path recursion.
    /// The approximate walk ignores `condition`.
    pub approximate: bool,
    /// Pool raw features into attributed columns.
    pub column_map: Option<ColumnMap<'a>>,
    /// Conditioning for this pass. Interaction prediction sets this
    /// internally and ignores the caller's value.
    pub condition: Condition,
    /// Optional per-row margin added to the bias column in place of the
    /// forest base score. Row-major `[row, group]` covering all rows up to
    /// `base_rowid + n_rows`.
    pub base_margin: Option<&'a [f32]>,
}

impl<'a> ContributionOptions<'a> {
    pub fn with_ntree_limit(mut self, ntree_limit: usize) -> Self {
        self.ntree_limit = ntree_limit;
        self
    }

    pub fn with_tree_weights(mut self, tree_weights: &'a [f32]) -> Self {
        self.tree_weights = Some(tree_weights);
        self
    }

    pub fn with_approximate(mut self, approximate: bool) -> Self {
        self.approximate = approximate;
        self
    }

    pub fn with_column_map(mut self, column_map: ColumnMap<'a>) -> Self {
        self.column_map = Some(column_map);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_base_margin(mut self, base_margin: &'a [f32]) -> Self {
        self.base_margin = Some(base_margin);
        self
    }
}

impl Predictor<'_> {
    /// Number of attributed columns for a set of options (excluding bias).
    pub(super) fn attribution_columns(&self, options: &ContributionOptions<'_>) -> usize {
        options
            .column_map
            .map(|m| m.n_columns())
            .unwrap_or_else(|| self.forest().n_features())
    }

    /// Predict per-feature contributions, allocating the output buffer.
    ///
    /// The buffer covers rows `0..base_rowid + n_rows` in row-major
    /// `[row, group, column]` layout where the column axis has one slot per
    /// attributed column plus a trailing bias slot. For every row and group,
    /// the slots sum to the margin prediction.
    pub fn predict_contributions<R: RowSource>(
        &self,
        rows: &R,
        options: &ContributionOptions<'_>,
        parallelism: Parallelism,
    ) -> Result<Vec<f32>, PredictError> {
        let stride = self.n_groups() * (self.attribution_columns(options) + 1);
        let n_total = rows.base_rowid() + rows.n_rows();
        let mut output = vec![0.0; n_total * stride];
        self.predict_contributions_into(rows, options, parallelism, &mut output)?;
        Ok(output)
    }

    /// Predict per-feature contributions into a caller-provided buffer.
    ///
    /// Only the region covering this batch's rows is written; it is zeroed
    /// on entry, so batches compose but repeated calls do not accumulate.
    pub fn predict_contributions_into<R: RowSource>(
        &self,
        rows: &R,
        options: &ContributionOptions<'_>,
        parallelism: Parallelism,
        output: &mut [f32],
    ) -> Result<(), PredictError> {
        self.check_columns(rows)?;
        let forest = self.forest();
        let limit = resolve_tree_limit(forest.n_trees(), options.ntree_limit);
        if let Some(w) = options.tree_weights {
            if w.len() != limit {
                return Err(PredictError::WeightCountMismatch {
                    expected: limit,
                    actual: w.len(),
                });
            }
        }

        let n_groups = self.n_groups();
        let ncols_p1 = self.attribution_columns(options) + 1;
        let stride = n_groups * ncols_p1;
        let base = rows.base_rowid();
        let n_rows = rows.n_rows();
        let needed = (base + n_rows) * stride;
        if output.len() < needed {
            return Err(PredictError::OutputTooSmall {
                needed,
                got: output.len(),
            });
        }

        // Per-tree covers and mean values; covers double as the path weights
        // of the exact recursion.
        let per_tree = parallelism.maybe_par_map(0..limit, |t| {
            let tree = forest.tree(t);
            tree.covers()
                .map(|covers| (covers, approx::node_mean_values(tree, covers)))
                .ok_or(PredictError::MissingCovers { tree: t })
        });
        let per_tree: Vec<(&[f32], Box<[f32]>)> = per_tree.into_iter().collect::<Result<_, _>>()?;

        let margin = validated_margin(options.base_margin, (base + n_rows) * n_groups, n_groups);
        let base_score = forest.base_score();

        let region = &mut output[base * stride..needed];
        region.fill(0.0);
        if n_rows == 0 {
            return Ok(());
        }

        parallelism.maybe_par_bridge_for_each_init(
            region.chunks_mut(stride).enumerate(),
            || (self.scratch.checkout(1), vec![0.0f32; ncols_p1]),
            |(slab, tree_phi), (row, chunk)| {
                let fvec = &mut slab[0];
                fvec.fill(rows, row);

                for t in 0..limit {
                    let (covers, means) = &per_tree[t];
                    let tree = forest.tree(t);
                    let group = forest.tree_group(t) as usize;
                    let phi = &mut chunk[group * ncols_p1..(group + 1) * ncols_p1];

                    match options.tree_weights {
                        None => accumulate_tree(tree, covers, means, fvec, phi, options),
                        Some(w) => {
                            tree_phi.fill(0.0);
                            accumulate_tree(tree, covers, means, fvec, tree_phi, options);
                            for (acc, &c) in phi.iter_mut().zip(tree_phi.iter()) {
                                *acc += c * w[t];
                            }
                        }
                    }
                }

                for g in 0..n_groups {
                    let bias = match margin {
                        Some(m) => m[(base + row) * n_groups + g],
                        None => base_score,
                    };
                    chunk[g * ncols_p1 + ncols_p1 - 1] += bias;
                }

                fvec.reset(rows, row);
            },
        );

        Ok(())
    }
}

fn accumulate_tree(
    tree: &crate::repr::Tree,
    covers: &[f32],
    mean_values: &[f32],
    fvec: &super::FeatureVector,
    phi: &mut [f32],
    options: &ContributionOptions<'_>,
) {
    if options.approximate {
        approx::calculate_contributions_approx(tree, mean_values, fvec, phi, options.column_map);
    } else {
        exact::calculate_contributions(
            tree,
            covers,
            mean_values,
            fvec,
            phi,
            options.condition,
            options.column_map,
        );
    }
}
