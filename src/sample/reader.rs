use polars::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::debug;

use std::path::Path;
use std::collections::BTreeSet;

use crate::{Result, SegmentError};
use crate::common::{checker, utils};
use super::dataset::Dataset;
use super::feature::*;


/// How the binary target is derived from the target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    /// The column is boolean, or numeric with values in `{0, 1}`.
    Boolean,
    /// A string column; the target is positive iff it equals `positive`.
    Label {
        /// The positive label.
        positive: String,
    },
    /// A numeric column; the target is positive iff it exceeds `value`.
    Threshold {
        /// The threshold.
        value: f64,
    },
    /// A numeric column; the target is positive iff it exceeds
    /// the `q`-quantile of the column.
    Quantile {
        /// Quantile level in `[0, 1]`.
        q: f64,
    },
}


/// What to do with missing (or unparsable) feature values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Fail on the first missing value.
    Reject,
    /// Replace missing values by sentinels.
    /// Non-finite numeric values are replaced as well.
    Sentinel {
        /// Replacement for numeric features.
        numeric: f64,
        /// Replacement level for categorical features.
        categorical: String,
    },
}


/// A struct that returns [`Dataset`].
/// Using this struct, one can read a CSV file
/// (or an in-memory `DataFrame`) to [`Dataset`]
/// under an explicit schema.
/// # Example
/// ```no_run
/// use miniseg::prelude::*;
///
/// let dataset = DatasetReader::new()
///     .file("/path/to/customers.csv")
///     .has_header(true)
///     .target("tenure", TargetRule::Quantile { q: 0.75 })
///     .feature(FeatureSpec::categorical("Contract"))
///     .feature(FeatureSpec::numeric("MonthlyCharges"))
///     .read()
///     .unwrap();
/// ```
pub struct DatasetReader<P> {
    file: Option<P>,
    has_header: bool,
    target: Option<(String, TargetRule)>,
    schema: Vec<FeatureSpec>,
    missing: MissingPolicy,
}


impl<P> Default for DatasetReader<P> {
    fn default() -> Self {
        Self::new()
    }
}


impl<P> DatasetReader<P> {
    /// Construct a new instance of [`DatasetReader`].
    /// By default, the file has a header row
    /// and missing values are rejected.
    pub fn new() -> Self {
        Self {
            file: None,
            has_header: true,
            target: None,
            schema: Vec::new(),
            missing: MissingPolicy::Reject,
        }
    }


    /// Set the flag whether the file has the header row or not.
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }


    /// Set the target column and the rule deriving the binary target.
    pub fn target<S: ToString>(mut self, column: S, rule: TargetRule) -> Self {
        self.target = Some((column.to_string(), rule));
        self
    }


    /// Declare a feature.
    pub fn feature(mut self, spec: FeatureSpec) -> Self {
        self.schema.push(spec);
        self
    }


    /// Declare all features at once.
    /// Replaces the previously declared features.
    pub fn schema(mut self, schema: Vec<FeatureSpec>) -> Self {
        self.schema = schema;
        self
    }


    /// Set the missing-value policy.
    pub fn missing(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }


    /// Convert the given `DataFrame` to [`Dataset`].
    /// Only the target column and the declared features are read.
    pub fn read_dataframe(&self, df: &DataFrame) -> Result<Dataset> {
        let (target_name, rule) = self.target.as_ref()
            .ok_or_else(|| SegmentError::InvalidParameter(
                "target column is not specified; \
                 use `DatasetReader::target`".into()
            ))?;
        if self.schema.is_empty() {
            return Err(SegmentError::InvalidParameter(
                "no feature is declared".into()
            ));
        }

        let target = derive_target(column(df, target_name)?, rule)?;

        let features = self.schema.iter()
            .map(|spec| {
                let series = column(df, &spec.name)?;
                let column = match spec.kind {
                    FeatureKind::Numeric => {
                        numeric_column(series, &self.missing)?
                    },
                    FeatureKind::Categorical => {
                        categorical_column(series, &self.missing)?
                    },
                };
                Ok(Feature::new(&spec.name, column))
            })
            .collect::<Result<Vec<_>>>()?;

        let dataset = Dataset::new(target_name, target, features)?;
        debug!(
            "read {} records, {} features, {} positive",
            dataset.shape().0,
            dataset.shape().1,
            dataset.n_positive(),
        );
        Ok(dataset)
    }
}


impl<P> DatasetReader<P>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }


    /// Reads the CSV file based on the arguments,
    /// and returns [`Dataset`].
    pub fn read(self) -> Result<Dataset> {
        let file = self.file.as_ref()
            .ok_or_else(|| SegmentError::InvalidParameter(
                "the file name is not set; use `DatasetReader::file`".into()
            ))?;

        let df = CsvReader::from_path(file.as_ref())?
            .has_header(self.has_header)
            .finish()?;

        self.read_dataframe(&df)
    }
}


fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| SegmentError::MissingColumn { name: name.to_string() })
}


/// Reads a numeric column.
/// Unparsable strings are treated as missing values.
/// Under [`MissingPolicy::Sentinel`], so are non-finite values.
fn numeric_column(series: &Series, missing: &MissingPolicy)
    -> Result<Column>
{
    let name = series.name();
    let values = series.cast(&DataType::Float64)?;
    let values = values.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, x)| match (x, missing) {
            (Some(x), MissingPolicy::Sentinel { numeric, .. })
                if !x.is_finite() => Ok(*numeric),
            (Some(x), _) => Ok(x),
            (None, MissingPolicy::Sentinel { numeric, .. }) => Ok(*numeric),
            (None, MissingPolicy::Reject) => {
                Err(SegmentError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            },
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Column::Numeric(values))
}


/// Reads a categorical column.
/// The levels are the distinct values in lexicographic order.
fn categorical_column(series: &Series, missing: &MissingPolicy)
    -> Result<Column>
{
    let name = series.name();
    let values = series.cast(&DataType::Utf8)?;
    let values = values.utf8()?
        .into_iter()
        .enumerate()
        .map(|(row, x)| match (x, missing) {
            (Some(x), _) => Ok(x.trim().to_string()),
            (None, MissingPolicy::Sentinel { categorical, .. }) => {
                Ok(categorical.clone())
            },
            (None, MissingPolicy::Reject) => {
                Err(SegmentError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            },
        })
        .collect::<Result<Vec<String>>>()?;

    let levels = values.iter()
        .cloned()
        .collect::<BTreeSet<_>>();
    Column::categorical(name, levels, values)
}


/// Derives the binary target from `series` under `rule`.
/// Missing target values are always rejected.
fn derive_target(series: &Series, rule: &TargetRule) -> Result<Vec<bool>> {
    let name = series.name();
    let missing = |row| SegmentError::MissingValue {
        column: name.to_string(),
        row,
    };

    match rule {
        TargetRule::Boolean => {
            if let Ok(values) = series.bool() {
                let target = values.into_iter()
                    .enumerate()
                    .map(|(row, y)| y.ok_or_else(|| missing(row)))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(target);
            }
            let values = series.cast(&DataType::Float64)?;
            let target = values.f64()?
                .into_iter()
                .enumerate()
                .map(|(row, y)| match y {
                    Some(y) if y == 0.0 => Ok(false),
                    Some(y) if y == 1.0 => Ok(true),
                    Some(y) => Err(SegmentError::InvalidParameter(format!(
                        "boolean target `{name}` has value {y} at row {row}"
                    ))),
                    None => Err(missing(row)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(target)
        },
        TargetRule::Label { positive } => {
            let values = series.cast(&DataType::Utf8)?;
            let target = values.utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, y)| {
                    y.map(|y| y.trim() == positive)
                        .ok_or_else(|| missing(row))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(target)
        },
        TargetRule::Threshold { value } => {
            let values = finite_values(series)?;
            Ok(values.into_iter().map(|x| x > *value).collect())
        },
        TargetRule::Quantile { q } => {
            checker::check_probability("q", *q)?;
            let values = finite_values(series)?;
            let threshold = utils::quantile(&values, *q)
                .ok_or(SegmentError::EmptyDataset)?;
            debug!("target `{name}`: {q}-quantile threshold is {threshold}");
            Ok(values.into_iter().map(|x| x > threshold).collect())
        },
    }
}


fn finite_values(series: &Series) -> Result<Vec<f64>> {
    let name = series.name();
    let values = series.cast(&DataType::Float64)?;
    let values = values.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, x)| match x {
            Some(x) if x.is_finite() => Ok(x),
            Some(_) => Err(SegmentError::NonFinite {
                feature: name.to_string(),
                row,
            }),
            None => Err(SegmentError::MissingValue {
                column: name.to_string(),
                row,
            }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(values)
}
