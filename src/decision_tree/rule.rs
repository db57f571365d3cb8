//! Human-readable conjunctions of conditions describing each segment.
use serde::Serialize;

use std::fmt;

use crate::{Result, SegmentError};
use crate::sample::{Record, Value};
use crate::segment::SegmentId;
use super::node::{ClassCounts, NodeId};


/// The test a single feature value must pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Clause {
    /// `value < threshold`.
    Below {
        /// The split threshold.
        threshold: f64,
    },
    /// `value >= threshold`.
    AtLeast {
        /// The split threshold.
        threshold: f64,
    },
    /// `value ∈ levels`.
    OneOf {
        /// The accepted levels.
        levels: Vec<String>,
    },
}


impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Below { threshold } => write!(f, "< {threshold}"),
            Self::AtLeast { threshold } => write!(f, ">= {threshold}"),
            Self::OneOf { levels } => write!(f, "in {{{}}}", levels.join(", ")),
        }
    }
}


/// A clause applied to a named feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// Feature name.
    pub feature: String,
    /// The test.
    #[serde(flatten)]
    pub clause: Clause,
}


impl Condition {
    /// Returns `true` if `record` passes this condition.
    ///
    /// Fails if the feature is absent from the record's dataset,
    /// or if its kind does not match the clause.
    pub fn holds(&self, record: &Record<'_>) -> Result<bool> {
        let value = record.value(&self.feature)?;
        let holds = match (&self.clause, value) {
            (Clause::Below { threshold }, Value::Numeric(x)) => x < *threshold,
            (Clause::AtLeast { threshold }, Value::Numeric(x)) => x >= *threshold,
            (Clause::OneOf { levels }, Value::Categorical(level)) => {
                levels.iter().any(|l| l == level)
            },
            (Clause::OneOf { .. }, Value::Numeric(_)) => {
                return Err(self.kind_mismatch("categorical", "numeric"));
            },
            (_, Value::Categorical(_)) => {
                return Err(self.kind_mismatch("numeric", "categorical"));
            },
        };
        Ok(holds)
    }


    fn kind_mismatch(&self, expected: &str, found: &str) -> SegmentError {
        SegmentError::KindMismatch {
            name: self.feature.clone(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}


impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.feature, self.clause)
    }
}


/// The root-to-leaf path of a pruned tree,
/// i.e., the definition of one segment.
///
/// An empty list of conditions matches every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafRule {
    pub(crate) segment: SegmentId,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) prediction: bool,
    pub(crate) counts: ClassCounts,
    #[serde(skip)]
    pub(crate) node: NodeId,
}


impl LeafRule {
    /// Returns the segment this rule defines.
    #[inline]
    pub fn segment(&self) -> SegmentId {
        self.segment
    }


    /// Returns the conditions in root-to-leaf order.
    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions[..]
    }


    /// Returns the majority class of the training records in the leaf.
    #[inline]
    pub fn prediction(&self) -> bool {
        self.prediction
    }


    /// Returns the class counts of the training records in the leaf.
    #[inline]
    pub fn counts(&self) -> ClassCounts {
        self.counts
    }


    /// Returns the leaf node of the pruned tree.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }


    /// Returns `true` if `record` satisfies every condition.
    pub fn matches(&self, record: &Record<'_>) -> Result<bool> {
        for condition in &self.conditions {
            if !condition.holds(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}


impl fmt::Display for LeafRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment {}: ", self.segment)?;
        if self.conditions.is_empty() {
            write!(f, "(all records)")?;
        } else {
            let conditions = self.conditions.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" AND ");
            write!(f, "{conditions}")?;
        }
        write!(
            f,
            " => {} (n = {}, {:.1}% positive)",
            self.prediction,
            self.counts.n(),
            100.0 * self.counts.positive_rate(),
        )
    }
}
