use serde::Serialize;
use tracing::debug;

use std::fmt;

use crate::{Result, SegmentError};
use crate::sample::{Dataset, FeatureSpec, Record};
use crate::segment::{SegmentAssignment, SegmentId, SegmentMethod};
use super::cp_table::CpTable;
use super::node::NodeKind;
use super::rule::{Condition, LeafRule};
use super::tree::Tree;


/// Total impurity decrease brought by a predictor
/// over the splits of the pruned tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    /// Predictor name.
    pub feature: String,
    /// Count-weighted impurity decrease.
    pub importance: f64,
    /// `importance` as a percentage of the total.
    pub percent: f64,
}


/// A pruned classification tree whose leaves are segments.
///
/// Segments are numbered `1..=L` in pre-order of the leaves,
/// and each one is described by a [`LeafRule`].
/// Built by [`DecisionTreeBuilder`](super::DecisionTreeBuilder).
#[derive(Debug, Clone)]
pub struct DecisionTreeSegmenter {
    predictors: Vec<FeatureSpec>,
    tree: Tree,
    rules: Vec<LeafRule>,
    importance: Vec<FeatureImportance>,
    cp_table: CpTable,
}


impl DecisionTreeSegmenter {
    pub(super) fn new(
        predictors: Vec<FeatureSpec>,
        mut tree: Tree,
        cp_table: CpTable,
    ) -> Self
    {
        let n_segments = tree.number_leaves();
        let rules = extract_rules(&tree);
        let importance = feature_importance(&tree, &predictors);
        debug!("pruned tree has {n_segments} segments");

        Self { predictors, tree, rules, importance, cp_table }
    }


    /// Returns the segment of `record`.
    ///
    /// Every leaf rule is evaluated.
    /// A record matching no rule, or more than one,
    /// means the pruned tree is broken
    /// and yields [`SegmentError::RuleViolation`].
    pub fn assign(&self, record: &Record<'_>) -> Result<SegmentId> {
        let mut matched = Vec::new();
        for rule in &self.rules {
            if rule.matches(record)? {
                matched.push(rule.segment);
            }
        }

        if let [segment] = matched[..] {
            return Ok(segment);
        }
        Err(SegmentError::RuleViolation { row: record.row(), matched })
    }


    /// Returns the segment of every record of `dataset` in row order.
    pub fn assign_all(&self, dataset: &Dataset) -> Result<SegmentAssignment> {
        let ids = dataset.records()
            .map(|record| self.assign(&record))
            .collect::<Result<Vec<_>>>()?;
        SegmentAssignment::new(SegmentMethod::Tree, ids, self.n_segments())
    }


    /// Returns the majority class of the segment of `record`.
    pub fn predict(&self, record: &Record<'_>) -> Result<bool> {
        let segment = self.assign(record)?;
        Ok(self.rules[segment.0 - 1].prediction)
    }


    /// Returns the leaf rules ordered by segment id.
    #[inline]
    pub fn rules(&self) -> &[LeafRule] {
        &self.rules[..]
    }


    /// Returns the feature importance ranked in descending order.
    #[inline]
    pub fn importance(&self) -> &[FeatureImportance] {
        &self.importance[..]
    }


    /// Returns the CP table of the candidate subtrees.
    #[inline]
    pub fn cp_table(&self) -> &CpTable {
        &self.cp_table
    }


    /// Returns the pruned tree.
    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }


    /// Returns the predictors the tree was grown on.
    #[inline]
    pub fn predictors(&self) -> &[FeatureSpec] {
        &self.predictors[..]
    }


    /// Returns the number of segments, i.e., leaves.
    #[inline]
    pub fn n_segments(&self) -> usize {
        self.rules.len()
    }
}


/// Returns the root-to-leaf conjunction of each leaf, in pre-order.
fn extract_rules(tree: &Tree) -> Vec<LeafRule> {
    tree.leaves()
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id);
            let NodeKind::Leaf(leaf) = node.kind() else { return None; };
            let segment = leaf.segment()?;

            let conditions = tree.path_to(id)
                .into_iter()
                .filter_map(|(parent, side)| match tree.node(parent).kind() {
                    NodeKind::Branch(branch) => Some(Condition {
                        feature: branch.rule().feature().to_string(),
                        clause: branch.rule().clause(side),
                    }),
                    NodeKind::Leaf(_) => None,
                })
                .collect();

            Some(LeafRule {
                segment,
                conditions,
                prediction: node.prediction(),
                counts: node.counts(),
                node: id,
            })
        })
        .collect()
}


/// Sum the impurity decrease of the surviving splits per predictor.
/// Ties keep the predictor order.
fn feature_importance(tree: &Tree, predictors: &[FeatureSpec])
    -> Vec<FeatureImportance>
{
    let mut importance = predictors.iter()
        .map(|spec| {
            let total = tree.preorder()
                .into_iter()
                .filter_map(|id| match tree.node(id).kind() {
                    NodeKind::Branch(b) if b.rule().feature() == spec.name => {
                        Some(b.improvement())
                    },
                    _ => None,
                })
                .sum::<f64>();
            FeatureImportance {
                feature: spec.name.clone(),
                importance: total,
                percent: 0.0,
            }
        })
        .collect::<Vec<_>>();

    let total = importance.iter().map(|fi| fi.importance).sum::<f64>();
    if total > 0.0 {
        importance.iter_mut()
            .for_each(|fi| { fi.percent = 100.0 * fi.importance / total; });
    }
    importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    importance
}


impl fmt::Display for DecisionTreeSegmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.cp_table)?;
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
