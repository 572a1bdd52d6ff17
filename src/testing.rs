//! Test helpers for building trees by hand.

use crate::repr::Tree;

/// Incremental builder behind the [`scalar_tree!`](crate::scalar_tree) macro.
///
/// Nodes may be declared in any order; storage grows to the largest id seen.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, id: u32) {
        let len = id as usize + 1;
        if self.is_leaf.len() < len {
            self.split_indices.resize(len, 0);
            self.split_thresholds.resize(len, 0.0);
            self.left_children.resize(len, 0);
            self.right_children.resize(len, 0);
            self.default_left.resize(len, false);
            self.is_leaf.resize(len, false);
            self.leaf_values.resize(len, 0.0);
        }
    }

    /// Declare a numerical split node.
    pub fn split(
        &mut self,
        id: u32,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: u32,
        right: u32,
    ) -> &mut Self {
        self.ensure(id);
        let i = id as usize;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.left_children[i] = left;
        self.right_children[i] = right;
        self.default_left[i] = default_left;
        self.is_leaf[i] = false;
        self
    }

    /// Declare a leaf node.
    pub fn leaf(&mut self, id: u32, value: f32) -> &mut Self {
        self.ensure(id);
        let i = id as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
        self
    }

    pub fn build(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
        )
    }
}

/// Build a scalar-leaf [`Tree`](crate::repr::Tree) from a compact node list.
///
/// Each line is `id => num(feature, threshold, L|R) -> left, right,` for a
/// split (the letter is the default direction for missing values) or
/// `id => leaf(value),` for a leaf.
///
/// ```
/// let tree = leafcast::scalar_tree! {
///     0 => num(0, 0.5, L) -> 1, 2,
///     1 => leaf(-1.0),
///     2 => leaf(1.0),
/// };
/// assert_eq!(tree.n_nodes(), 3);
/// ```
#[macro_export]
macro_rules! scalar_tree {
    (@munch $b:ident,) => {};
    (@munch $b:ident, $id:literal => num ( $feature:expr, $threshold:expr, L ) -> $left:literal, $right:literal, $($rest:tt)*) => {
        $b.split($id, $feature, $threshold, true, $left, $right);
        $crate::scalar_tree!(@munch $b, $($rest)*);
    };
    (@munch $b:ident, $id:literal => num ( $feature:expr, $threshold:expr, R ) -> $left:literal, $right:literal, $($rest:tt)*) => {
        $b.split($id, $feature, $threshold, false, $left, $right);
        $crate::scalar_tree!(@munch $b, $($rest)*);
    };
    (@munch $b:ident, $id:literal => leaf ( $value:expr ), $($rest:tt)*) => {
        $b.leaf($id, $value);
        $crate::scalar_tree!(@munch $b, $($rest)*);
    };
    ($($tokens:tt)+) => {{
        let mut builder = $crate::testing::TreeBuilder::new();
        $crate::scalar_tree!(@munch builder, $($tokens)+);
        builder.build()
    }};
}
