//! Arena representation of a binary decision tree,
//! its growth and its weakest-link pruning.
use std::fmt;

use crate::sample::Dataset;
use crate::segment::SegmentId;
use super::criterion::{Criterion, MIN_IMPROVEMENT};
use super::node::*;
use super::split_rule::*;


/// Parameters that stop the growth of a tree.
#[derive(Debug, Clone)]
pub(super) struct Grower {
    pub(super) positions: Vec<usize>,
    pub(super) criterion: Criterion,
    pub(super) min_split: usize,
    pub(super) min_bucket: usize,
    pub(super) max_depth: usize,
}


impl Grower {
    /// Grow the full tree on `rows` of `dataset`.
    pub(super) fn grow(&self, dataset: &Dataset, rows: Vec<usize>) -> Tree {
        let mut nodes = Vec::new();
        self.full_tree(dataset, &mut nodes, rows, None, 0);
        Tree { nodes }
    }


    /// Construct a full tree recursively.
    /// Nodes are pushed in pre-order,
    /// so the root is always `NodeId(0)`.
    fn full_tree(
        &self,
        dataset: &Dataset,
        nodes: &mut Vec<Node>,
        rows: Vec<usize>,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId
    {
        let counts = ClassCounts::from_rows(dataset.target(), &rows);
        let impurity = self.criterion.impurity(counts);

        let id = NodeId(nodes.len());
        nodes.push(Node::leaf(parent, depth, counts, impurity));


        // Stop growing if the node is pure, too small or too deep.
        if counts.is_pure()
            || rows.len() < self.min_split
            || depth >= self.max_depth
        {
            return id;
        }


        let best = self.criterion.best_split(
            dataset, &self.positions, &rows, self.min_bucket
        );
        let Some(best) = best else { return id; };

        let node_score = rows.len() as f64 * impurity;
        let improvement = best.improvement(node_score);
        if improvement <= MIN_IMPROVEMENT { return id; }


        let rule = best.rule;
        let column = &dataset[&rule.feature];
        let (lrows, rrows): (Vec<usize>, Vec<usize>) = rows.into_iter()
            .partition(|&i| rule.split_column(column, i) == LR::Left);

        if lrows.is_empty() || rrows.is_empty() { return id; }


        let left = self.full_tree(dataset, nodes, lrows, Some(id), depth + 1);
        let right = self.full_tree(dataset, nodes, rrows, Some(id), depth + 1);

        nodes[id.0].kind = NodeKind::Branch(BranchNode {
            rule, left, right, improvement,
        });
        id
    }
}


/// A binary decision tree stored as an arena of [`Node`]s.
///
/// After growth or pruning the arena is compacted,
/// so every node is reachable and the nodes are in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}


impl Tree {
    /// Returns the root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }


    /// Returns the node `id`.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }


    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }


    /// Returns `true` if the tree has no node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }


    /// Returns the nodes reachable from the root in pre-order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let NodeKind::Branch(branch) = &self.nodes[id.0].kind {
                stack.push(branch.right);
                stack.push(branch.left);
            }
        }
        order
    }


    /// Returns the leaves in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id.0].is_leaf())
            .collect()
    }


    /// Returns the number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.leaves().len()
    }


    /// Returns the number of splits, i.e., `n_leaves - 1`.
    pub fn n_splits(&self) -> usize {
        self.n_leaves() - 1
    }


    /// Returns the number of misclassified training records.
    pub fn risk(&self) -> f64 {
        self.leaves()
            .into_iter()
            .map(|id| self.nodes[id.0].loss_as_leaf())
            .sum()
    }


    /// Returns the leaf that the `row`-th record of `dataset` reaches.
    pub fn leaf_of(&self, dataset: &Dataset, row: usize) -> NodeId {
        let mut id = self.root();
        while let NodeKind::Branch(branch) = &self.nodes[id.0].kind {
            id = match branch.rule.split(dataset, row) {
                LR::Left => branch.left,
                LR::Right => branch.right,
            };
        }
        id
    }


    /// Returns the majority class of the leaf
    /// that the `row`-th record of `dataset` reaches.
    #[inline]
    pub fn predict(&self, dataset: &Dataset, row: usize) -> bool {
        self.nodes[self.leaf_of(dataset, row).0].prediction()
    }


    /// Returns the branches from the root to `id`
    /// with the side taken at each of them.
    pub fn path_to(&self, id: NodeId) -> Vec<(NodeId, LR)> {
        let mut path = Vec::new();
        let mut child = id;
        while let Some(parent) = self.nodes[child.0].parent {
            let side = match &self.nodes[parent.0].kind {
                NodeKind::Branch(b) if b.left == child => LR::Left,
                _ => LR::Right,
            };
            path.push((parent, side));
            child = parent;
        }
        path.reverse();
        path
    }


    /// Number the leaves `1..=L` in pre-order.
    pub(super) fn number_leaves(&mut self) -> usize {
        let leaves = self.leaves();
        for (k, id) in leaves.iter().enumerate() {
            if let NodeKind::Leaf(leaf) = &mut self.nodes[id.0].kind {
                leaf.segment = Some(SegmentId(k + 1));
            }
        }
        leaves.len()
    }


    /// Turn the branch `id` into a leaf.
    /// Its descendants become unreachable until `compact` is called.
    fn collapse(&mut self, id: NodeId) {
        self.nodes[id.0].kind = NodeKind::Leaf(LeafNode::default());
    }


    /// Returns a copy holding only the reachable nodes, in pre-order.
    fn compact(&self) -> Self {
        let order = self.preorder();
        let mut new_id = vec![None; self.nodes.len()];
        for (k, id) in order.iter().enumerate() {
            new_id[id.0] = Some(NodeId(k));
        }
        let remap = |id: NodeId| {
            new_id[id.0].expect("A reachable node has a new position")
        };

        let nodes = order.iter()
            .map(|id| {
                let mut node = self.nodes[id.0].clone();
                node.parent = node.parent.map(remap);
                if let NodeKind::Branch(branch) = &mut node.kind {
                    branch.left = remap(branch.left);
                    branch.right = remap(branch.right);
                }
                node
            })
            .collect();
        Self { nodes }
    }


    /// Returns `(R(T_t), |T_t|)` for each reachable node `t`,
    /// the training error and the number of leaves
    /// of the subtree rooted at `t`.
    fn subtree_stats(&self) -> Vec<(f64, usize)> {
        let mut stats = vec![(0.0, 0); self.nodes.len()];
        for id in self.preorder().into_iter().rev() {
            let node = &self.nodes[id.0];
            stats[id.0] = match &node.kind {
                NodeKind::Leaf(_) => (node.loss_as_leaf(), 1),
                NodeKind::Branch(b) => {
                    let (rl, nl) = stats[b.left.0];
                    let (rr, nr) = stats[b.right.0];
                    (rl + rr, nl + nr)
                },
            };
        }
        stats
    }


    /// Returns the nested sequence of weakest-link subtrees.
    ///
    /// Each entry is `(alpha, subtree)`, where `subtree` is optimal
    /// for complexity parameters in `[alpha, next alpha)`.
    /// The alphas are non-decreasing, the first one is `0`
    /// and the last subtree is the root alone.
    /// Every branch whose link strength
    /// `g(t) = (R(t) - R(T_t)) / (|T_t| - 1)`
    /// attains the minimum is collapsed at once.
    pub(super) fn pruning_sequence(&self) -> Vec<(f64, Tree)> {
        let mut tree = self.compact();
        let mut sequence = vec![(0.0, tree.clone())];

        while !tree.nodes[0].is_leaf() {
            let stats = tree.subtree_stats();
            let links = tree.preorder()
                .into_iter()
                .filter(|id| !tree.nodes[id.0].is_leaf())
                .map(|id| {
                    let (r_sub, n_leaves) = stats[id.0];
                    let r_node = tree.nodes[id.0].loss_as_leaf();
                    let g = (r_node - r_sub) / (n_leaves - 1) as f64;
                    (id, g.max(0.0))
                })
                .collect::<Vec<_>>();

            let g_min = links.iter()
                .map(|(_, g)| *g)
                .fold(f64::INFINITY, f64::min);
            let tol = 1e-12 * (1.0 + g_min.abs());
            links.iter()
                .filter(|(_, g)| *g <= g_min + tol)
                .for_each(|(id, _)| tree.collapse(*id));
            tree = tree.compact();

            let last = sequence.last()
                .map(|(alpha, _)| *alpha)
                .unwrap_or(0.0);
            let alpha = g_min.max(last);
            if alpha <= last {
                // The same complexity parameter prunes further.
                let n = sequence.len();
                sequence[n - 1] = (last, tree.clone());
            } else {
                sequence.push((alpha, tree.clone()));
            }
        }
        sequence
    }
}


/// Returns the subtree of `sequence` that is optimal
/// for the complexity parameter `alpha`.
pub(super) fn prune_at(sequence: &[(f64, Tree)], alpha: f64) -> &Tree {
    let tol = 1e-12 * (1.0 + alpha.abs());
    sequence.iter()
        .take_while(|(a, _)| *a <= alpha + tol)
        .last()
        .or_else(|| sequence.first())
        .map(|(_, tree)| tree)
        .expect("A pruning sequence is never empty")
}


impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.preorder() {
            let node = &self.nodes[id.0];
            let indent = "  ".repeat(node.depth);
            let side = node.parent
                .zip(self.path_to(id).last().map(|(_, side)| *side))
                .and_then(|(parent, side)| match &self.nodes[parent.0].kind {
                    NodeKind::Branch(b) => Some(
                        format!("{} {} ", b.rule.feature, b.rule.clause(side))
                    ),
                    NodeKind::Leaf(_) => None,
                })
                .unwrap_or_else(|| String::from("root "));
            let counts = node.counts;
            write!(
                f,
                "{indent}{side}n={} pos={} ({:.1}%)",
                counts.n(), counts.positive, 100.0 * counts.positive_rate(),
            )?;
            if let NodeKind::Leaf(leaf) = &node.kind {
                if let Some(segment) = leaf.segment {
                    write!(f, " -> segment {segment}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
