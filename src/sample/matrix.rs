use ndarray::{Array2, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Serialize, Deserialize};

use crate::{Result, SegmentError};
use super::dataset::Dataset;
use super::feature::*;


/// How categorical features become numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// One column holding the level index.
    Ordinal,
    /// One `0/1` column per declared level,
    /// named `feature=level`.
    OneHot,
}


/// A dense numeric table derived from a [`Dataset`].
///
/// Row `i` of the matrix is record `i` of the dataset it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}


impl FeatureMatrix {
    /// Construct a matrix from column names and an `(n_rows, n_cols)` array.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(SegmentError::LengthMismatch {
                what: "matrix column names",
                expected: values.ncols(),
                found: names.len(),
            });
        }
        Ok(Self { names, values })
    }


    /// Build the matrix of the features `specs` of `dataset`.
    /// Every spec must exist in the dataset with the declared kind.
    pub fn from_dataset(
        dataset: &Dataset,
        specs: &[FeatureSpec],
        encoding: Encoding,
    ) -> Result<Self>
    {
        let positions = dataset.resolve(specs)?;
        let n_sample = dataset.shape().0;

        let mut names = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();
        for k in positions {
            let feature = &dataset.features()[k];
            match (&feature.column, encoding) {
                (Column::Numeric(values), _) => {
                    names.push(feature.name.clone());
                    columns.push(values.clone());
                },
                (Column::Categorical { codes, .. }, Encoding::Ordinal) => {
                    names.push(feature.name.clone());
                    columns.push(codes.iter().map(|&c| c as f64).collect());
                },
                (Column::Categorical { levels, codes }, Encoding::OneHot) => {
                    for (l, level) in levels.iter().enumerate() {
                        names.push(format!("{}={level}", feature.name));
                        columns.push(
                            codes.iter()
                                .map(|&c| if c == l { 1.0 } else { 0.0 })
                                .collect()
                        );
                    }
                },
            }
        }

        let n_cols = columns.len();
        let values = Array2::from_shape_fn((n_sample, n_cols), |(i, j)| {
            columns[j][i]
        });
        Ok(Self { names, values })
    }


    /// Returns the pair of the number of rows and columns.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }


    /// Returns the number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }


    /// Returns the number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }


    /// Returns the column names.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names[..]
    }


    /// Returns the values.
    #[inline]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }


    /// Returns the `i`-th row.
    #[inline]
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }


    /// Returns the `j`-th column.
    #[inline]
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.values.column(j)
    }


    /// Returns the position of the column named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }


    /// Returns the matrix restricted to `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }


    /// Returns the same matrix with `suffix` appended to every column name.
    pub(crate) fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            names: self.names.iter().map(|n| format!("{n}{suffix}")).collect(),
            values: self.values.clone(),
        }
    }


    /// Convert into a list of `polars::Series`, one per column.
    pub fn to_series(&self) -> Vec<Series> {
        self.names.iter()
            .enumerate()
            .map(|(j, name)| {
                let column = self.values.column(j).to_vec();
                Series::new(name, column)
            })
            .collect()
    }
}
