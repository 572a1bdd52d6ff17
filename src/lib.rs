//! Batched inference and attribution for gradient-boosted decision trees.
//!
//! The crate takes a trained forest of scalar-leaf binary trees and answers
//! three questions about a batch of rows: what does the model predict
//! (margin scores), where does each row land (leaf indices), and why
//! (per-feature contributions and pairwise interactions in the SHAP sense).
//!
//! ```ignore
//! use leafcast::data::DenseRows;
//! use leafcast::{Parallelism, Predictor};
//!
//! let predictor = Predictor::new(&forest);
//! let rows = DenseRows::new(&values, n_rows, n_cols);
//!
//! let margins = predictor.predict(&rows, 0, 0, Parallelism::Parallel)?;
//! let leaves = predictor.predict_leaf(&rows, 0, Parallelism::Parallel)?;
//! ```
//!
//! Inputs come through the [`data::RowSource`] trait (dense slices, CSR
//! arrays, or `ndarray` views); forests are built from
//! [`repr::Tree`]/[`repr::Forest`]. Thread-pool setup is handled by
//! [`run_with_threads`].

pub mod data;
pub mod explainability;
pub mod inference;
pub mod repr;
pub mod testing;
pub mod utils;

// Re-export for downstream test assertions.
pub use approx;

pub use explainability::{ColumnMap, Condition};
pub use inference::{
    ContributionOptions, FeatureVector, PredictError, Predictor, DEFAULT_BLOCK_SIZE,
};
pub use utils::{run_with_threads, Parallelism};
