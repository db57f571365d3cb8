use serde::Serialize;

use crate::common::utils;
use super::summary::SummaryTable;


/// The spread of the segment means of each feature.
///
/// For every feature, the sample variance across segments
/// of the per-segment mean; then their sum and average.
/// Only segments with at least one record take part,
/// and fewer than two of them give `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeparationScore {
    /// Scored feature names.
    pub features: Vec<String>,
    /// Variance of the segment means of each feature.
    pub per_feature: Vec<f64>,
    /// Sum of `per_feature`.
    pub total: f64,
    /// Average of `per_feature`, or `0` without features.
    pub mean: f64,
}


/// The separation score of one target class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSeparation {
    /// The target value the records were filtered on.
    pub target: bool,
    /// Number of records with that target value.
    pub n_records: usize,
    /// Separation of the re-summarized segments.
    pub score: SeparationScore,
}


impl SeparationScore {
    /// Score the features of `summary` not listed in `exclude`.
    /// The percent-positive column is never scored.
    pub fn from_summary<S: AsRef<str>>(summary: &SummaryTable, exclude: &[S])
        -> Self
    {
        let populated = summary.rows()
            .iter()
            .filter(|row| row.count > 0)
            .collect::<Vec<_>>();

        let (features, per_feature): (Vec<String>, Vec<f64>) = summary.features()
            .iter()
            .enumerate()
            .filter(|(_, name)| !exclude.iter().any(|e| e.as_ref() == name.as_str()))
            .map(|(j, name)| {
                let means = populated.iter()
                    .map(|row| row.mean[j])
                    .collect::<Vec<_>>();
                (name.clone(), utils::sample_variance(&means))
            })
            .unzip();

        let total = per_feature.iter().sum::<f64>();
        let mean = if per_feature.is_empty() {
            0.0
        } else {
            total / per_feature.len() as f64
        };
        Self { features, per_feature, total, mean }
    }


    /// Returns the score of the feature named `name`.
    pub fn of(&self, name: &str) -> Option<f64> {
        self.features.iter()
            .position(|f| f == name)
            .map(|j| self.per_feature[j])
    }
}
