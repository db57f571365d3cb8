use polars::prelude::*;
use serde::Serialize;

use crate::Result;
use crate::segment::{SegmentId, SegmentMethod};


/// Descriptive statistics of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    /// Segment id.
    pub segment: SegmentId,
    /// Number of records.
    pub count: usize,
    /// Per-feature mean.
    pub mean: Vec<f64>,
    /// Per-feature sample standard deviation.
    /// A segment with fewer than two records has `0`.
    pub std: Vec<f64>,
    /// Percentage of records with a positive target.
    pub percent_positive: f64,
}


/// Per-segment statistics of one assignment, ordered by segment id.
///
/// A segment without any record is reported with zero statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub(super) method: SegmentMethod,
    pub(super) features: Vec<String>,
    pub(super) rows: Vec<SegmentSummary>,
}


impl SummaryTable {
    /// Returns the method of the summarized assignment.
    #[inline]
    pub fn method(&self) -> SegmentMethod {
        self.method
    }


    /// Returns the summarized feature names.
    #[inline]
    pub fn features(&self) -> &[String] {
        &self.features[..]
    }


    /// Returns one summary per segment.
    #[inline]
    pub fn rows(&self) -> &[SegmentSummary] {
        &self.rows[..]
    }


    /// Returns the summary of `segment`.
    pub fn get(&self, segment: SegmentId) -> Option<&SegmentSummary> {
        self.rows.iter().find(|row| row.segment == segment)
    }


    /// Returns the per-segment means of the feature named `name`.
    pub fn means_of(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.features.iter().position(|f| f == name)?;
        let means = self.rows.iter()
            .map(|row| row.mean[j])
            .collect();
        Some(means)
    }


    /// Convert into a `polars::DataFrame` with the columns
    /// `segment, count, <feature>_mean, <feature>_std, ..., percent_positive`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let segment = self.rows.iter()
            .map(|row| row.segment.0 as u64)
            .collect::<Vec<_>>();
        let count = self.rows.iter()
            .map(|row| row.count as u64)
            .collect::<Vec<_>>();

        let mut columns = vec![
            Series::new("segment", segment),
            Series::new("count", count),
        ];
        for (j, name) in self.features.iter().enumerate() {
            let mean = self.rows.iter().map(|r| r.mean[j]).collect::<Vec<_>>();
            let std = self.rows.iter().map(|r| r.std[j]).collect::<Vec<_>>();
            columns.push(Series::new(&format!("{name}_mean"), mean));
            columns.push(Series::new(&format!("{name}_std"), std));
        }
        let percent = self.rows.iter()
            .map(|row| row.percent_positive)
            .collect::<Vec<_>>();
        columns.push(Series::new("percent_positive", percent));

        Ok(DataFrame::new(columns)?)
    }
}
