use polars::prelude::*;
use serde::Serialize;

use std::fmt;

use crate::Result;
use crate::segment::{SegmentId, SegmentMethod};


/// The normalization of a [`ProbabilityTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// `count / population size`.
    Joint,
    /// `count / segment size`.
    Conditional,
}


impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Joint => "joint",
            Self::Conditional => "conditional",
        };
        write!(f, "{name}")
    }
}


/// One `(segment, target)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityCell {
    /// Segment id.
    pub segment: SegmentId,
    /// Target value.
    pub target: bool,
    /// Number of records in the cell.
    pub count: usize,
    /// Normalized count.
    pub probability: f64,
}


/// Counts and probabilities of every `(segment, target)` pair,
/// zero counts included.
///
/// Cells are ordered by segment, then `false` before `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityTable {
    pub(super) kind: TableKind,
    pub(super) method: SegmentMethod,
    pub(super) cells: Vec<ProbabilityCell>,
}


impl ProbabilityTable {
    /// Build a table from the per-segment `[negative, positive]` counts.
    /// A conditional cell of an empty segment has probability `0`.
    pub(super) fn from_counts(
        kind: TableKind,
        method: SegmentMethod,
        counts: &[[usize; 2]],
    ) -> Self
    {
        let total = counts.iter().flatten().sum::<usize>();
        let cells = counts.iter()
            .enumerate()
            .flat_map(|(s, pair)| {
                let denominator = match kind {
                    TableKind::Joint => total,
                    TableKind::Conditional => pair[0] + pair[1],
                };
                [false, true].into_iter().map(move |target| {
                    let count = pair[target as usize];
                    let probability = if denominator == 0 {
                        0.0
                    } else {
                        count as f64 / denominator as f64
                    };
                    ProbabilityCell {
                        segment: SegmentId(s + 1),
                        target,
                        count,
                        probability,
                    }
                })
            })
            .collect();
        Self { kind, method, cells }
    }


    /// Returns the normalization of this table.
    #[inline]
    pub fn kind(&self) -> TableKind {
        self.kind
    }


    /// Returns the method of the tabulated assignment.
    #[inline]
    pub fn method(&self) -> SegmentMethod {
        self.method
    }


    /// Returns the cells.
    #[inline]
    pub fn cells(&self) -> &[ProbabilityCell] {
        &self.cells[..]
    }


    /// Returns the cell `(segment, target)`.
    pub fn get(&self, segment: SegmentId, target: bool)
        -> Option<&ProbabilityCell>
    {
        self.cells.iter()
            .find(|cell| cell.segment == segment && cell.target == target)
    }


    /// Returns the probability of `(segment, target)`,
    /// or `0` for an unknown segment.
    pub fn probability(&self, segment: SegmentId, target: bool) -> f64 {
        self.get(segment, target)
            .map(|cell| cell.probability)
            .unwrap_or(0.0)
    }


    /// Convert into a `polars::DataFrame` with the columns
    /// `segment, target, count, probability`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let segment = self.cells.iter()
            .map(|c| c.segment.0 as u64)
            .collect::<Vec<_>>();
        let target = self.cells.iter().map(|c| c.target).collect::<Vec<_>>();
        let count = self.cells.iter()
            .map(|c| c.count as u64)
            .collect::<Vec<_>>();
        let probability = self.cells.iter()
            .map(|c| c.probability)
            .collect::<Vec<_>>();

        let df = DataFrame::new(vec![
            Series::new("segment", segment),
            Series::new("target", target),
            Series::new("count", count),
            Series::new("probability", probability),
        ])?;
        Ok(df)
    }
}
