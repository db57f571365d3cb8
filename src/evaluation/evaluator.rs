use tracing::debug;

use crate::{Dataset, FeatureMatrix, Result, SegmentError};
use crate::common::utils;
use crate::segment::{SegmentAssignment, SegmentMethod};
use super::probability::{ProbabilityTable, TableKind};
use super::separation::{OutcomeSeparation, SeparationScore};
use super::summary::{SegmentSummary, SummaryTable};


/// Statistics of any segment assignment of a dataset.
///
/// Every operation fails with [`SegmentError::LengthMismatch`]
/// if the assignment does not cover the dataset.
#[derive(Debug, Clone, Copy)]
pub struct SegmentEvaluator<'a> {
    dataset: &'a Dataset,
    raw: &'a FeatureMatrix,
}


impl<'a> SegmentEvaluator<'a> {
    /// Construct a new evaluator over `dataset`
    /// and its raw-scale feature matrix.
    pub fn new(dataset: &'a Dataset, raw: &'a FeatureMatrix) -> Result<Self> {
        let n_sample = dataset.shape().0;
        if raw.n_rows() != n_sample {
            return Err(SegmentError::LengthMismatch {
                what: "feature matrix rows",
                expected: n_sample,
                found: raw.n_rows(),
            });
        }
        Ok(Self { dataset, raw })
    }


    /// Summarize each segment on the raw scale.
    pub fn summary(&self, assignment: &SegmentAssignment)
        -> Result<SummaryTable>
    {
        self.summary_of(self.raw, assignment)
    }


    /// Summarize each segment on the columns of `matrix`,
    /// whose rows must be aligned with the dataset.
    pub fn summary_of(
        &self,
        matrix: &FeatureMatrix,
        assignment: &SegmentAssignment,
    ) -> Result<SummaryTable>
    {
        let n_sample = self.dataset.shape().0;
        assignment.check_len(n_sample)?;
        if matrix.n_rows() != n_sample {
            return Err(SegmentError::LengthMismatch {
                what: "feature matrix rows",
                expected: n_sample,
                found: matrix.n_rows(),
            });
        }

        let table = summarize(matrix, self.dataset.target(), assignment);
        debug!(
            "summarized {} {} segments",
            table.rows.len(), assignment.method(),
        );
        Ok(table)
    }


    /// Returns `count / population size` for every `(segment, target)`.
    pub fn joint_probabilities(&self, assignment: &SegmentAssignment)
        -> Result<ProbabilityTable>
    {
        let counts = self.counts(assignment)?;
        Ok(ProbabilityTable::from_counts(
            TableKind::Joint, assignment.method(), &counts
        ))
    }


    /// Returns `count / segment size` for every `(segment, target)`.
    pub fn conditional_probabilities(&self, assignment: &SegmentAssignment)
        -> Result<ProbabilityTable>
    {
        let counts = self.counts(assignment)?;
        Ok(ProbabilityTable::from_counts(
            TableKind::Conditional, assignment.method(), &counts
        ))
    }


    /// Returns the separation score of `summary`,
    /// leaving out the features named in `exclude`.
    pub fn separation_score<S: AsRef<str>>(
        &self,
        summary: &SummaryTable,
        exclude: &[S],
    ) -> SeparationScore
    {
        SeparationScore::from_summary(summary, exclude)
    }


    /// Returns one separation score per target value,
    /// each computed on the records with that value
    /// after re-summarizing the segments on the raw scale.
    pub fn separation_by_outcome<S: AsRef<str>>(
        &self,
        assignment: &SegmentAssignment,
        exclude: &[S],
    ) -> Result<Vec<OutcomeSeparation>>
    {
        assignment.check_len(self.dataset.shape().0)?;
        let target = self.dataset.target();

        let scores = [false, true].into_iter()
            .map(|value| {
                let rows = (0..target.len())
                    .filter(|&i| target[i] == value)
                    .collect::<Vec<_>>();
                let matrix = self.raw.select_rows(&rows);
                let sub_target = rows.iter()
                    .map(|&i| target[i])
                    .collect::<Vec<_>>();
                let sub_assignment = assignment.subset(&rows);

                let summary = summarize(&matrix, &sub_target, &sub_assignment);
                OutcomeSeparation {
                    target: value,
                    n_records: rows.len(),
                    score: SeparationScore::from_summary(&summary, exclude),
                }
            })
            .collect();
        Ok(scores)
    }


    /// Returns the `[negative, positive]` counts of each segment.
    fn counts(&self, assignment: &SegmentAssignment)
        -> Result<Vec<[usize; 2]>>
    {
        assignment.check_len(self.dataset.shape().0)?;

        let mut counts = vec![[0_usize; 2]; assignment.n_segments()];
        assignment.ids()
            .iter()
            .zip(self.dataset.target())
            .for_each(|(id, &y)| { counts[id.0 - 1][y as usize] += 1; });
        Ok(counts)
    }
}


fn summarize(
    matrix: &FeatureMatrix,
    target: &[bool],
    assignment: &SegmentAssignment,
) -> SummaryTable
{
    let method: SegmentMethod = assignment.method();
    let n_features = matrix.n_cols();

    let rows = assignment.segments()
        .map(|segment| {
            let members = assignment.rows_of(segment);
            let count = members.len();

            let (mean, std): (Vec<f64>, Vec<f64>) = (0..n_features)
                .map(|j| {
                    let column = matrix.column(j);
                    let values = members.iter()
                        .map(|&i| column[i])
                        .collect::<Vec<_>>();
                    (utils::mean(&values), utils::sample_std(&values))
                })
                .unzip();

            let n_positive = members.iter().filter(|&&i| target[i]).count();
            let percent_positive = if count == 0 {
                0.0
            } else {
                100.0 * n_positive as f64 / count as f64
            };

            SegmentSummary { segment, count, mean, std, percent_positive }
        })
        .collect();

    SummaryTable {
        method,
        features: matrix.names().to_vec(),
        rows,
    }
}
