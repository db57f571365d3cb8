//! Defines the inner representation
//! of the decision tree.
use serde::{Serialize, Deserialize};

use std::ops;

use crate::segment::SegmentId;
use super::split_rule::*;


/// Stable identifier of a node in a [`Tree`](super::Tree) arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct NodeId(pub(crate) usize);


impl NodeId {
    /// Returns the position of this node in the arena.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}


/// Number of negative / positive records.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize,
)]
pub struct ClassCounts {
    /// Records with a negative target.
    pub negative: usize,
    /// Records with a positive target.
    pub positive: usize,
}


impl ClassCounts {
    /// Count the targets of `rows`.
    pub fn from_rows(target: &[bool], rows: &[usize]) -> Self {
        let mut counts = Self::default();
        rows.iter().for_each(|&i| counts.add(target[i]));
        counts
    }


    /// Add a record of class `y`.
    #[inline]
    pub fn add(&mut self, y: bool) {
        if y { self.positive += 1; } else { self.negative += 1; }
    }


    /// Returns the total count.
    #[inline]
    pub fn n(&self) -> usize {
        self.negative + self.positive
    }


    /// Returns `true` if at most one class is present.
    #[inline]
    pub fn is_pure(&self) -> bool {
        self.negative == 0 || self.positive == 0
    }


    /// Returns the majority class.
    /// Ties go to the negative class.
    #[inline]
    pub fn majority(&self) -> bool {
        self.positive > self.negative
    }


    /// Returns the number of records misclassified
    /// by predicting the majority class.
    #[inline]
    pub fn misclassified(&self) -> usize {
        if self.majority() { self.negative } else { self.positive }
    }


    /// Returns the fraction of positive records.
    #[inline]
    pub fn positive_rate(&self) -> f64 {
        if self.n() == 0 { return 0.0; }
        self.positive as f64 / self.n() as f64
    }
}


impl ops::Sub for ClassCounts {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            negative: self.negative - rhs.negative,
            positive: self.positive - rhs.positive,
        }
    }
}


impl ops::Add for ClassCounts {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            negative: self.negative + rhs.negative,
            positive: self.positive + rhs.positive,
        }
    }
}


/// Enumeration of `BranchNode` and `LeafNode`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A node that have two childrens.
    Branch(BranchNode),
    /// A node that have no child.
    Leaf(LeafNode),
}


/// Represents the branch nodes of decision tree.
/// Each `BranchNode` must have two childrens.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub(crate) rule: Splitter,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    // Count-weighted impurity decrease of this split.
    pub(crate) improvement: f64,
}


impl BranchNode {
    /// Returns the splitting rule.
    #[inline]
    pub fn rule(&self) -> &Splitter {
        &self.rule
    }


    /// Returns the left child.
    #[inline]
    pub fn left(&self) -> NodeId {
        self.left
    }


    /// Returns the right child.
    #[inline]
    pub fn right(&self) -> NodeId {
        self.right
    }


    /// Returns the impurity decrease of this split.
    #[inline]
    pub fn improvement(&self) -> f64 {
        self.improvement
    }
}


/// Represents the leaf nodes of decision tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafNode {
    pub(crate) segment: Option<SegmentId>,
}


impl LeafNode {
    /// Returns the segment of this leaf,
    /// or `None` if the leaves are not numbered.
    #[inline]
    pub fn segment(&self) -> Option<SegmentId> {
        self.segment
    }
}


/// A node of the decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
    pub(crate) counts: ClassCounts,
    pub(crate) impurity: f64,
    pub(crate) kind: NodeKind,
}


impl Node {
    /// Construct a leaf node from the given arguments.
    #[inline]
    pub(crate) fn leaf(
        parent: Option<NodeId>,
        depth: usize,
        counts: ClassCounts,
        impurity: f64,
    ) -> Self
    {
        let kind = NodeKind::Leaf(LeafNode::default());
        Self { parent, depth, counts, impurity, kind }
    }


    /// Returns the parent node.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }


    /// Returns the depth. The root has depth `0`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }


    /// Returns the class counts of the records reaching this node.
    #[inline]
    pub fn counts(&self) -> ClassCounts {
        self.counts
    }


    /// Returns the impurity of this node.
    #[inline]
    pub fn impurity(&self) -> f64 {
        self.impurity
    }


    /// Returns the branch or leaf content.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }


    /// Returns `true` if this node has no child.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }


    /// Returns the majority class of this node.
    #[inline]
    pub fn prediction(&self) -> bool {
        self.counts.majority()
    }


    /// Returns the node misclassification cost of this node,
    /// i.e., the training error when this node is a leaf.
    #[inline]
    pub(crate) fn loss_as_leaf(&self) -> f64 {
        self.counts.misclassified() as f64
    }
}
