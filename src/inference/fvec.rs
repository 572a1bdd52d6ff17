//! Dense working feature vector.

use crate::data::RowSource;

/// Dense scratch vector one row is staged into before tree traversal.
///
/// Slots hold NaN while missing and the actual value once filled; a counter
/// of missing slots lets the traversal kernel skip per-node missing checks
/// entirely when a row is fully dense.
///
/// The fill/reset protocol is what makes reuse cheap: [`fill`](Self::fill)
/// writes only the entries one row actually has, and [`reset`](Self::reset)
/// un-fills exactly those entries, so the cost per row is proportional to its
/// non-missing count rather than to the feature count.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    values: Box<[f32]>,
    n_missing: usize,
}

impl FeatureVector {
    /// Create a vector with every slot missing.
    pub fn new(n_features: usize) -> Self {
        Self {
            values: vec![f32::NAN; n_features].into_boxed_slice(),
            n_missing: n_features,
        }
    }

    /// Number of feature slots.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.len()
    }

    /// Value at a feature slot (NaN when missing).
    #[inline]
    pub fn value(&self, feature: u32) -> f32 {
        self.values[feature as usize]
    }

    /// Check whether a feature slot is missing.
    #[inline]
    pub fn is_missing(&self, feature: u32) -> bool {
        self.values[feature as usize].is_nan()
    }

    /// True if any slot is missing.
    #[inline]
    pub fn has_missing(&self) -> bool {
        self.n_missing > 0
    }

    /// Fill one feature slot.
    #[inline]
    pub fn set(&mut self, feature: u32, value: f32) {
        let slot = &mut self.values[feature as usize];
        if slot.is_nan() && !value.is_nan() {
            self.n_missing -= 1;
        }
        *slot = value;
    }

    /// Return one feature slot to the missing state.
    #[inline]
    pub fn unset(&mut self, feature: u32) {
        let slot = &mut self.values[feature as usize];
        if !slot.is_nan() {
            self.n_missing += 1;
        }
        *slot = f32::NAN;
    }

    /// Stage a row's entries into the vector.
    pub fn fill<R: RowSource>(&mut self, rows: &R, row: usize) {
        rows.for_each_entry(row, |feature, value| self.set(feature, value));
    }

    /// Un-fill the entries staged by [`fill`](Self::fill) for the same row.
    ///
    /// After this the vector is bit-identical to its state before the fill,
    /// ready for the next row.
    pub fn reset<R: RowSource>(&mut self, rows: &R, row: usize) {
        rows.for_each_entry(row, |feature, _| self.unset(feature));
    }
}
