//! `ndarray` adapter.

use ndarray::ArrayView2;

use super::RowSource;

/// Row source over an `ndarray` view of shape `[n_rows, n_columns]`.
///
/// Works with any stride (owned arrays, slices, transposed views). Values
/// equal to the missing sentinel (default NaN) are skipped.
#[derive(Debug, Clone, Copy)]
pub struct ArrayRows<'a> {
    view: ArrayView2<'a, f32>,
    missing: f32,
    base_rowid: usize,
}

impl<'a> ArrayRows<'a> {
    /// Create an array-backed row source.
    pub fn new(view: ArrayView2<'a, f32>) -> Self {
        Self {
            view,
            missing: f32::NAN,
            base_rowid: 0,
        }
    }

    /// Treat `missing` as the missing-value sentinel in addition to NaN.
    pub fn with_missing(mut self, missing: f32) -> Self {
        self.missing = missing;
        self
    }

    /// Set the batch's row offset within the logical input matrix.
    pub fn with_base_rowid(mut self, base_rowid: usize) -> Self {
        self.base_rowid = base_rowid;
        self
    }
}

impl RowSource for ArrayRows<'_> {
    #[inline]
    fn n_rows(&self) -> usize {
        self.view.nrows()
    }

    #[inline]
    fn n_columns(&self) -> usize {
        self.view.ncols()
    }

    #[inline]
    fn base_rowid(&self) -> usize {
        self.base_rowid
    }

    #[inline]
    fn for_each_entry<F: FnMut(u32, f32)>(&self, row: usize, mut f: F) {
        for (col, &value) in self.view.row(row).iter().enumerate() {
            if !value.is_nan() && value != self.missing {
                f(col as u32, value);
            }
        }
    }
}
