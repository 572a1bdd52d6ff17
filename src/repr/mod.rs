//! Model representation: trees and forests.
//!
//! The model is immutable for the duration of a prediction call. Trees are
//! stored in a structure-of-arrays layout for cache-friendly traversal, and a
//! [`Forest`] groups trees with their output-group assignments.

mod forest;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{Tree, TreeValidationError};

/// Node index local to one tree (0 = root).
pub type NodeId = u32;
