//! Canonical forest representation (collection of trees).

use super::{tree::TreeValidationError, Tree};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    TreeGroupsLenMismatch { n_trees: usize, len: usize },
    TreeGroupOutOfRange { tree_idx: usize, group: u32, n_groups: u32 },
    SplitIndexOutOfRange { tree_idx: usize, feature: u32, n_features: usize },
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Forest of decision trees.
///
/// Stores multiple trees with their group assignments for multi-class support,
/// the feature count the trees were built against, and the global base score
/// seeding every prediction.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    n_features: usize,
    base_score: f32,
}

impl Forest {
    /// Create a new forest with the given number of output groups and features.
    pub fn new(n_groups: u32, n_features: usize) -> Self {
        debug_assert!(n_groups > 0, "a forest needs at least one output group");
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            n_features,
            base_score: 0.0,
        }
    }

    /// Create a forest for regression (single output group).
    pub fn for_regression(n_features: usize) -> Self {
        Self::new(1, n_features)
    }

    /// Set the global base score.
    pub fn with_base_score(mut self, base_score: f32) -> Self {
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        debug_assert!(group < self.n_groups, "group out of range");
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Number of features the trees split on.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get the global base score.
    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Get all tree group assignments as a slice.
    #[inline]
    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    /// Group assignment of one tree.
    #[inline]
    pub fn tree_group(&self, idx: usize) -> u32 {
        self.tree_groups[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Validate structural invariants for this forest.
    ///
    /// Intended for debug checks and tests (e.g., model conversion invariants).
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.tree_groups.len() != self.trees.len() {
            return Err(ForestValidationError::TreeGroupsLenMismatch {
                n_trees: self.trees.len(),
                len: self.tree_groups.len(),
            });
        }

        for (i, &g) in self.tree_groups.iter().enumerate() {
            if g >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx: i,
                    group: g,
                    n_groups: self.n_groups,
                });
            }
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;

            for node in 0..tree.n_nodes() {
                let node = node as u32;
                if !tree.is_leaf(node) && tree.split_index(node) as usize >= self.n_features {
                    return Err(ForestValidationError::SplitIndexOutOfRange {
                        tree_idx: i,
                        feature: tree.split_index(node),
                        n_features: self.n_features,
                    });
                }
            }
        }

        Ok(())
    }
}
