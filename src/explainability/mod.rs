//! Feature attribution for tree forests.
//!
//! The heavy lifting lives in the private submodules: [`exact`] implements
//! the polynomial-time SHAP value recursion over decision paths, [`approx`]
//! the cheaper mean-value walk down the decided path. Both are driven by
//! [`Predictor::predict_contributions`](crate::Predictor::predict_contributions).
//!
//! This module exposes the vocabulary types callers configure attribution
//! with: [`Condition`] and [`ColumnMap`].

pub(crate) mod approx;
pub(crate) mod exact;
mod path;

/// Conditioning for an attribution pass.
///
/// Conditioned passes are the building block of interaction values: `On(c)`
/// fixes attributed column `c` present (decision paths that would drop it
/// get weight zero), `Off(c)` fixes it absent (paths are reweighted as if
/// the column were always missing). The conditioned column itself receives
/// no attribution, and the bias column is left without the tree expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    /// Ordinary SHAP values.
    #[default]
    Unconditioned,
    /// Condition on attributed column `c` being present.
    On(u32),
    /// Condition on attributed column `c` being absent.
    Off(u32),
}

impl Condition {
    /// Sign encoding used by the recursion: 0, +1 or -1.
    #[inline]
    pub(crate) fn sign(self) -> i8 {
        match self {
            Condition::Unconditioned => 0,
            Condition::On(_) => 1,
            Condition::Off(_) => -1,
        }
    }

    /// The conditioned attributed column, if any.
    #[inline]
    pub(crate) fn feature(self) -> u32 {
        match self {
            Condition::Unconditioned => u32::MAX,
            Condition::On(c) | Condition::Off(c) => c,
        }
    }
}

/// Many-to-one mapping from raw feature indices to attributed columns.
///
/// Lets callers pool related features (say, the one-hot columns of a
/// categorical) into a single attribution column. Path bookkeeping still
/// happens per raw feature; only the attribution write-out and condition
/// comparisons use the mapped column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap<'a> {
    map: &'a [u32],
    n_columns: usize,
}

impl<'a> ColumnMap<'a> {
    /// Create a column map; `map[feature]` is the attributed column of a raw
    /// feature, and attribution output has `n_columns` columns plus bias.
    pub fn new(map: &'a [u32], n_columns: usize) -> Self {
        debug_assert!(
            map.iter().all(|&c| (c as usize) < n_columns),
            "mapped column out of range"
        );
        Self { map, n_columns }
    }

    /// Number of attributed columns (excluding bias).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Attributed column of a raw feature.
    #[inline]
    pub fn column_of(&self, feature: u32) -> u32 {
        self.map[feature as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_encoding() {
        assert_eq!(Condition::default(), Condition::Unconditioned);
        assert_eq!(Condition::Unconditioned.sign(), 0);
        assert_eq!(Condition::On(3).sign(), 1);
        assert_eq!(Condition::Off(3).sign(), -1);
        assert_eq!(Condition::On(3).feature(), 3);
    }

    #[test]
    fn column_map_pools_features() {
        let map = [0u32, 0, 1];
        let cm = ColumnMap::new(&map, 2);
        assert_eq!(cm.n_columns(), 2);
        assert_eq!(cm.column_of(0), 0);
        assert_eq!(cm.column_of(1), 0);
        assert_eq!(cm.column_of(2), 1);
    }
}
