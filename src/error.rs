//! Defines the error type shared by every stage of the pipeline.
use polars::prelude::PolarsError;
use thiserror::Error;

use crate::segment::SegmentId;


/// A `Result` alias whose error type is [`SegmentError`].
pub type Result<T> = std::result::Result<T, SegmentError>;


/// Errors raised while reading data or building segments.
///
/// Recoverable conditions (k-means non-convergence, empty clusters,
/// non-monotone elbow curves) are **not** errors.
/// They are reported as [`Warning`](crate::Warning)s
/// alongside the otherwise complete output.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Failed to read or write a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),


    /// Failed to parse or write a `DataFrame`.
    #[error(transparent)]
    Polars(#[from] PolarsError),


    /// Failed to parse the configuration.
    #[error(transparent)]
    Json(#[from] serde_json::Error),


    /// The dataset has no records.
    #[error("the dataset has no records")]
    EmptyDataset,


    /// The column named `name` does not exist.
    #[error("column `{name}` does not exist")]
    MissingColumn {
        /// Column name.
        name: String,
    },


    /// A feature is declared twice.
    #[error("feature `{name}` is declared more than once")]
    DuplicateFeature {
        /// Feature name.
        name: String,
    },


    /// A feature is used with a kind different from its declaration.
    #[error("feature `{name}` is {found}, expected {expected}")]
    KindMismatch {
        /// Feature name.
        name: String,
        /// Expected kind.
        expected: String,
        /// Actual kind.
        found: String,
    },


    /// A numeric value is `NaN` or infinite.
    #[error("non-finite value in feature `{feature}` at row {row}")]
    NonFinite {
        /// Feature name.
        feature: String,
        /// Row index.
        row: usize,
    },


    /// A value is missing and the missing-value policy rejects it.
    #[error("missing value in column `{column}` at row {row}")]
    MissingValue {
        /// Column name.
        column: String,
        /// Row index.
        row: usize,
    },


    /// A categorical value is not one of the declared levels.
    #[error("`{value}` is not a level of categorical feature `{feature}`")]
    UnknownLevel {
        /// Feature name.
        feature: String,
        /// The offending value.
        value: String,
    },


    /// Two aligned sequences have different lengths.
    #[error("{what}: expected length {expected}, got {found}")]
    LengthMismatch {
        /// What was compared.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },


    /// A parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),


    /// A record matches zero or several leaf rules.
    /// The pruned tree is broken, so the run must stop.
    #[error(
        "record {row} matches {} leaf rules (segments {matched:?}), \
         expected exactly one",
        matched.len()
    )]
    RuleViolation {
        /// Row index of the record.
        row: usize,
        /// Segments whose rule matched.
        matched: Vec<SegmentId>,
    },
}
