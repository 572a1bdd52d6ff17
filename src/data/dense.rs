//! Row-major dense slice adapter.

use super::RowSource;

/// Dense row-major matrix backed by a flat slice.
///
/// Values equal to the missing sentinel (default NaN) are skipped during the
/// entry walk, so downstream the row behaves exactly like a sparse row.
#[derive(Debug, Clone, Copy)]
pub struct DenseRows<'a> {
    values: &'a [f32],
    n_rows: usize,
    n_cols: usize,
    missing: f32,
    base_rowid: usize,
}

impl<'a> DenseRows<'a> {
    /// Create a dense row source over `values` with shape `n_rows x n_cols`.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != n_rows * n_cols`.
    pub fn new(values: &'a [f32], n_rows: usize, n_cols: usize) -> Self {
        assert_eq!(
            values.len(),
            n_rows * n_cols,
            "dense buffer length must equal n_rows * n_cols"
        );
        Self {
            values,
            n_rows,
            n_cols,
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

    /// Contiguous slice of one row.
    #[inline]
    pub fn row_slice(&self, row: usize) -> &'a [f32] {
        &self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }
}

impl RowSource for DenseRows<'_> {
    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_columns(&self) -> usize {
        self.n_cols
    }

    #[inline]
    fn base_rowid(&self) -> usize {
        self.base_rowid
    }

    #[inline]
    fn for_each_entry<F: FnMut(u32, f32)>(&self, row: usize, mut f: F) {
        for (col, &value) in self.row_slice(row).iter().enumerate() {
            if !value.is_nan() && value != self.missing {
                f(col as u32, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(rows: &DenseRows<'_>, row: usize) -> Vec<(u32, f32)> {
        let mut out = Vec::new();
        rows.for_each_entry(row, |i, v| out.push((i, v)));
        out
    }

    #[test]
    fn skips_nan_values() {
        let data = [1.0, f32::NAN, 3.0];
        let rows = DenseRows::new(&data, 1, 3);
        assert_eq!(entries(&rows, 0), vec![(0, 1.0), (2, 3.0)]);
    }

    #[test]
    fn skips_missing_sentinel() {
        let data = [1.0, -999.0, 3.0, -999.0];
        let rows = DenseRows::new(&data, 2, 2).with_missing(-999.0);
        assert_eq!(entries(&rows, 0), vec![(0, 1.0)]);
        assert_eq!(entries(&rows, 1), vec![(0, 3.0)]);
    }

    #[test]
    fn base_rowid_defaults_to_zero() {
        let data = [1.0];
        let rows = DenseRows::new(&data, 1, 1);
        assert_eq!(rows.base_rowid(), 0);
        assert_eq!(rows.with_base_rowid(5).base_rowid(), 5);
    }

    #[test]
    #[should_panic(expected = "dense buffer length")]
    fn wrong_shape_panics() {
        let data = [1.0, 2.0, 3.0];
        let _ = DenseRows::new(&data, 2, 2);
    }
}
