//! Splitting criteria and the best-split search.
use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::fmt;
use std::cmp::Ordering;

use crate::sample::{Column, Dataset};
use super::node::ClassCounts;
use super::split_rule::*;


/// A split must decrease the count-weighted impurity
/// by more than this amount.
pub(super) const MIN_IMPROVEMENT: f64 = 1e-9;


/// Score for a splitting,
/// the count-weighted impurity of the two children.
/// This is just a wrapper for `f64`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug)]
pub(super) struct Score(f64);


impl From<f64> for Score {
    #[inline(always)]
    fn from(score: f64) -> Self {
        Self(score)
    }
}


impl PartialEq for Score {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}


impl PartialOrd for Score {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}


/// Splitting criteria for growing decision tree.
/// * `Criterion::Gini` minimizes the Gini index.
/// * `Criterion::Entropy` minimizes the entropic impurity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Gini index.
    Gini,
    /// Binary entropy function.
    Entropy,
}


impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gini => "Gini index",
            Self::Entropy => "Entropy",
        };

        write!(f, "{name}")
    }
}


/// The best split found for a node.
#[derive(Debug, Clone)]
pub(super) struct Candidate {
    pub(super) rule: Splitter,
    pub(super) score: Score,
}


impl Candidate {
    /// Returns the impurity decrease relative to
    /// `node_score`, the count-weighted impurity of the parent.
    #[inline]
    pub(super) fn improvement(&self, node_score: f64) -> f64 {
        node_score - self.score.0
    }
}


impl Criterion {
    /// Returns the impurity of a node with the given class counts.
    pub fn impurity(&self, counts: ClassCounts) -> f64 {
        let n = counts.n();
        if n == 0 { return 0.0; }

        let n = n as f64;
        let p = counts.positive as f64 / n;
        let q = counts.negative as f64 / n;
        match self {
            Self::Gini => gini_impurity(p, q),
            Self::Entropy => entropic_impurity(p, q),
        }
    }


    /// Returns `n * impurity`.
    #[inline]
    pub(super) fn weighted_impurity(&self, counts: ClassCounts) -> f64 {
        counts.n() as f64 * self.impurity(counts)
    }


    /// Returns the best split of `rows` over the features at `positions`.
    /// Each side of the split must receive at least `min_bucket` records.
    ///
    /// Features are scanned in parallel.
    /// Ties go to the feature that appears first in `positions`.
    pub(super) fn best_split(
        &self,
        dataset: &Dataset,
        positions: &[usize],
        rows: &[usize],
        min_bucket: usize,
    ) -> Option<Candidate>
    {
        let target = dataset.target();
        let features = dataset.features();

        positions.par_iter()
            .map(|&k| {
                let feature = &features[k];
                let name = feature.name();
                match feature.column() {
                    Column::Numeric(values) => {
                        self.split_numeric(values, target, rows, min_bucket)
                            .map(|(threshold, score)| {
                                let test = Test::LessThan(threshold);
                                let rule = Splitter::new(name, test);
                                Candidate { rule, score }
                            })
                    },
                    Column::Categorical { levels, codes } => {
                        let n_levels = levels.len();
                        self.split_categorical(
                            n_levels, codes, target, rows, min_bucket
                        )
                        .map(|(codes, score)| {
                            let levels = levels.clone();
                            let test = Test::OneOf { codes, levels };
                            let rule = Splitter::new(name, test);
                            Candidate { rule, score }
                        })
                    },
                }
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .fold(None, |best: Option<Candidate>, cand| {
                match best {
                    Some(b) if b.score <= cand.score => Some(b),
                    _ => Some(cand),
                }
            })
    }


    /// Sweep the sorted values of a numeric feature.
    /// The threshold is the midpoint between
    /// two consecutive distinct values.
    fn split_numeric(
        &self,
        values: &[f64],
        target: &[bool],
        rows: &[usize],
        min_bucket: usize,
    ) -> Option<(Threshold, Score)>
    {
        let n = rows.len();
        let mut order = rows.to_vec();
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]).then(i.cmp(&j)));

        let total = ClassCounts::from_rows(target, rows);
        let mut left = ClassCounts::default();

        let mut best: Option<(Threshold, Score)> = None;
        for w in 0..n.saturating_sub(1) {
            left.add(target[order[w]]);

            let x = values[order[w]];
            let x_next = values[order[w + 1]];
            if x == x_next { continue; }

            let n_left = w + 1;
            if n_left < min_bucket || n - n_left < min_bucket { continue; }

            let right = total - left;
            let score = Score::from(
                self.weighted_impurity(left) + self.weighted_impurity(right)
            );

            let better = best.as_ref().map_or(true, |(_, s)| score < *s);
            if better {
                best = Some((Threshold::from(midpoint(x, x_next)), score));
            }
        }
        best
    }


    /// Order the levels present in `rows` by their positive rate
    /// and sweep the prefixes of that order.
    /// For a binary target the best subset split is such a prefix.
    fn split_categorical(
        &self,
        n_levels: usize,
        codes: &[usize],
        target: &[bool],
        rows: &[usize],
        min_bucket: usize,
    ) -> Option<(FixedBitSet, Score)>
    {
        let mut per_level = vec![ClassCounts::default(); n_levels];
        rows.iter().for_each(|&i| per_level[codes[i]].add(target[i]));

        let mut present = (0..n_levels)
            .filter(|&l| per_level[l].n() > 0)
            .collect::<Vec<_>>();
        if present.len() < 2 { return None; }

        present.sort_by(|&a, &b| {
            per_level[a].positive_rate()
                .total_cmp(&per_level[b].positive_rate())
                .then(a.cmp(&b))
        });

        let n = rows.len();
        let total = ClassCounts::from_rows(target, rows);
        let mut left = ClassCounts::default();

        let mut best: Option<(usize, Score)> = None;
        for (w, &level) in present.iter().enumerate().take(present.len() - 1) {
            left = left + per_level[level];

            let n_left = left.n();
            if n_left < min_bucket || n - n_left < min_bucket { continue; }

            let right = total - left;
            let score = Score::from(
                self.weighted_impurity(left) + self.weighted_impurity(right)
            );

            let better = best.as_ref().map_or(true, |(_, s)| score < *s);
            if better { best = Some((w, score)); }
        }

        best.map(|(w, score)| {
            let mut set = FixedBitSet::with_capacity(n_levels);
            present[..=w].iter().for_each(|&l| set.insert(l));
            (set, score)
        })
    }
}


/// Returns the midpoint of `x < y`.
/// Falls back to `y` when the midpoint rounds to `x` or overflows,
/// so that `x` goes left and `y` goes right.
#[inline]
fn midpoint(x: f64, y: f64) -> f64 {
    let mid = x + (y - x) / 2.0;
    if mid > x && mid <= y { mid } else { y }
}


/// Gini index `1 - p^2 - q^2`.
#[inline(always)]
fn gini_impurity(p: f64, q: f64) -> f64 {
    1.0 - p.powi(2) - q.powi(2)
}


/// Binary entropy in nats.
#[inline(always)]
fn entropic_impurity(p: f64, q: f64) -> f64 {
    let h = |r: f64| if r > 0.0 { - r * r.ln() } else { 0.0 };
    h(p) + h(q)
}
