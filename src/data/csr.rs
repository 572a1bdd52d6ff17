//! Compressed-sparse-row adapter.

use super::RowSource;

/// Sparse matrix in CSR form.
///
/// Row `i` owns the entries `indices[indptr[i]..indptr[i + 1]]` /
/// `values[indptr[i]..indptr[i + 1]]`. Stored NaN values are skipped.
#[derive(Debug, Clone, Copy)]
pub struct CsrRows<'a> {
    indptr: &'a [usize],
    indices: &'a [u32],
    values: &'a [f32],
    n_cols: usize,
    base_rowid: usize,
}

impl<'a> CsrRows<'a> {
    /// Create a CSR row source.
    ///
    /// # Panics
    ///
    /// Panics if the arrays are inconsistent (`indptr` empty, non-monotonic,
    /// or not covering `indices`/`values`).
    pub fn new(indptr: &'a [usize], indices: &'a [u32], values: &'a [f32], n_cols: usize) -> Self {
        assert!(!indptr.is_empty(), "indptr must have at least one entry");
        assert_eq!(indices.len(), values.len(), "indices and values must align");
        assert_eq!(
            *indptr.last().unwrap(),
            values.len(),
            "indptr must cover all stored entries"
        );
        assert!(
            indptr.windows(2).all(|w| w[0] <= w[1]),
            "indptr must be non-decreasing"
        );
        Self {
            indptr,
            indices,
            values,
            n_cols,
            base_rowid: 0,
        }
    }

    /// Set the batch's row offset within the logical input matrix.
    pub fn with_base_rowid(mut self, base_rowid: usize) -> Self {
        self.base_rowid = base_rowid;
        self
    }
}

impl RowSource for CsrRows<'_> {
    #[inline]
    fn n_rows(&self) -> usize {
        self.indptr.len() - 1
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
        let range = self.indptr[row]..self.indptr[row + 1];
        for (&index, &value) in self.indices[range.clone()].iter().zip(&self.values[range]) {
            if !value.is_nan() {
                f(index, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_stored_entries_per_row() {
        // Row 0: (0, 1.0), (2, 3.0); row 1: empty; row 2: (1, 5.0)
        let indptr = [0usize, 2, 2, 3];
        let indices = [0u32, 2, 1];
        let values = [1.0f32, 3.0, 5.0];
        let rows = CsrRows::new(&indptr, &indices, &values, 3);

        assert_eq!(rows.n_rows(), 3);
        assert_eq!(rows.n_columns(), 3);

        let mut got = Vec::new();
        rows.for_each_entry(0, |i, v| got.push((i, v)));
        assert_eq!(got, vec![(0, 1.0), (2, 3.0)]);

        got.clear();
        rows.for_each_entry(1, |i, v| got.push((i, v)));
        assert!(got.is_empty());

        got.clear();
        rows.for_each_entry(2, |i, v| got.push((i, v)));
        assert_eq!(got, vec![(1, 5.0)]);
    }

    #[test]
    fn skips_stored_nan() {
        let indptr = [0usize, 2];
        let indices = [0u32, 1];
        let values = [f32::NAN, 2.0];
        let rows = CsrRows::new(&indptr, &indices, &values, 2);

        let mut got = Vec::new();
        rows.for_each_entry(0, |i, v| got.push((i, v)));
        assert_eq!(got, vec![(1, 2.0)]);
    }

    #[test]
    #[should_panic(expected = "indptr must cover")]
    fn inconsistent_indptr_panics() {
        let indptr = [0usize, 5];
        let indices = [0u32];
        let values = [1.0f32];
        let _ = CsrRows::new(&indptr, &indices, &values, 2);
    }
}
