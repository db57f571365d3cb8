//! Segmentation by the leaves of a pruned classification tree.
//!
//! The tree is grown greedily (CART), its weakest-link pruning
//! sequence is cross-validated into a [`CpTable`],
//! and the selected subtree becomes a [`DecisionTreeSegmenter`].

mod builder;
mod criterion;
mod cp_table;
mod cross_validation;
mod node;
mod rule;
mod segmenter;
mod split_rule;
mod tree;


pub use builder::{
    DecisionTreeBuilder,
    DEFAULT_COMPLEXITY_FLOOR,
    DEFAULT_MAX_DEPTH,
    DEFAULT_MIN_BUCKET,
    DEFAULT_MIN_SPLIT,
    DEFAULT_N_FOLDS,
};
pub use criterion::Criterion;
pub use cp_table::{CpRow, CpTable, PruneRule};
pub use cross_validation::CrossValidation;
pub use node::{BranchNode, ClassCounts, LeafNode, Node, NodeId, NodeKind};
pub use rule::{Clause, Condition, LeafRule};
pub use segmenter::{DecisionTreeSegmenter, FeatureImportance};
pub use split_rule::{Splitter, LR};
pub use tree::Tree;
