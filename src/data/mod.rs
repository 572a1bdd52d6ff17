//! Row sources for prediction input.
//!
//! A [`RowSource`] exposes an input matrix as sparse rows of
//! `(feature index, value)` pairs. The trait is statically dispatched: the
//! concrete source type is chosen once per prediction call and monomorphized
//! through the whole kernel, so there is no per-row layout dispatch.
//!
//! Adapters:
//!
//! - [`DenseRows`]: row-major `&[f32]` slice with a missing-value sentinel
//! - [`CsrRows`]: compressed-sparse-row arrays
//! - [`ArrayRows`]: `ndarray::ArrayView2<f32>` with any stride
//!
//! NaN values are always treated as missing, in every adapter.

mod csr;
mod dense;
mod ndarray;

pub use csr::CsrRows;
pub use dense::DenseRows;
pub use self::ndarray::ArrayRows;

/// Sparse row access for prediction input.
///
/// Entries of one row must have unique feature indices in `[0, n_columns)`;
/// their order is irrelevant. The same row must yield the same entry walk
/// every time it is visited; the feature-vector protocol relies on that to
/// un-fill exactly the slots it filled.
pub trait RowSource: Sync {
    /// Number of rows in this batch.
    fn n_rows(&self) -> usize;

    /// Number of feature columns.
    fn n_columns(&self) -> usize;

    /// Row offset of this batch within the logical input matrix.
    ///
    /// Output buffers are addressed by `base_rowid() + row`, so predicting a
    /// matrix batch by batch lands every row in its original position.
    fn base_rowid(&self) -> usize {
        0
    }

    /// Visit every non-missing entry of a row.
    fn for_each_entry<F: FnMut(u32, f32)>(&self, row: usize, f: F);
}
