//! This file defines split rules for decision tree.
use fixedbitset::FixedBitSet;

use std::fmt;

use crate::sample::{Column, Dataset};
use super::rule::Clause;


/// The output of the function `split` of `Splitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LR {
    /// The record goes to the left child.
    Left,
    /// The record goes to the right child.
    Right,
}


/// Threshold of a numeric split.
/// This is just a wrapper for `f64`.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
#[repr(transparent)]
pub(crate) struct Threshold(pub(crate) f64);


impl From<f64> for Threshold {
    #[inline]
    fn from(threshold: f64) -> Self {
        Self(threshold)
    }
}


/// The test performed at a branch node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Test {
    /// `value < threshold` goes left.
    LessThan(Threshold),
    /// `level ∈ codes` goes left.
    /// `levels` are all declared levels of the feature.
    OneOf {
        codes: FixedBitSet,
        levels: Vec<String>,
    },
}


/// A single-feature split.
#[derive(Debug, Clone, PartialEq)]
pub struct Splitter {
    pub(crate) feature: String,
    pub(crate) test: Test,
}


impl Splitter {
    #[inline]
    pub(crate) fn new(name: &str, test: Test) -> Self {
        Self { feature: name.to_string(), test }
    }


    /// Returns the name of the feature this split tests.
    #[inline]
    pub fn feature(&self) -> &str {
        &self.feature
    }


    /// Defines the splitting.
    #[inline]
    pub fn split(&self, data: &Dataset, row: usize) -> LR {
        self.split_column(&data[&self.feature], row)
    }


    /// Defines the splitting on an already resolved column.
    #[inline]
    pub(crate) fn split_column(&self, column: &Column, row: usize) -> LR {
        let goes_left = match (&self.test, column) {
            (Test::LessThan(threshold), Column::Numeric(values)) => {
                values[row] < threshold.0
            },
            (Test::OneOf { codes, .. }, Column::Categorical { codes: c, .. }) => {
                codes.contains(c[row])
            },
            _ => {
                panic!(
                    "The split on `{}` does not match the feature kind",
                    self.feature
                );
            },
        };

        if goes_left { LR::Left } else { LR::Right }
    }


    /// Returns the clause satisfied by the records sent to `side`.
    pub(crate) fn clause(&self, side: LR) -> Clause {
        match (&self.test, side) {
            (Test::LessThan(threshold), LR::Left) => {
                Clause::Below { threshold: threshold.0 }
            },
            (Test::LessThan(threshold), LR::Right) => {
                Clause::AtLeast { threshold: threshold.0 }
            },
            (Test::OneOf { codes, levels }, side) => {
                let want = side == LR::Left;
                let levels = levels.iter()
                    .enumerate()
                    .filter_map(|(k, level)| {
                        (codes.contains(k) == want).then(|| level.clone())
                    })
                    .collect();
                Clause::OneOf { levels }
            },
        }
    }
}


impl fmt::Display for Splitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clause = self.clause(LR::Left);
        write!(f, "{} {clause}", self.feature)
    }
}
