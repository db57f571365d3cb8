//! Zero-mean, unit-variance scaling of a [`FeatureMatrix`].
use ndarray::{Array1, ArrayView1, Axis, Zip};
use serde::{Serialize, Deserialize};

use crate::{FeatureMatrix, Result, SegmentError};


/// Per-feature mean and scale of a fitted standardization.
///
/// A feature with zero variance gets `scale == 1`,
/// so its standardized column is constant zero
/// and the inverse transform still recovers the raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}


impl Standardizer {
    /// Compute the sample mean and
    /// the sample standard deviation (`n - 1` denominator)
    /// of each column.
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let n_rows = matrix.n_rows();
        let values = matrix.values();

        let mut mean = values.mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(matrix.n_cols()));
        let mut scale = if n_rows < 2 {
            Array1::ones(matrix.n_cols())
        } else {
            values.std_axis(Axis(0), 1.0)
        };

        // A constant column is centered on its own value
        // so that the scaled column is exactly zero.
        for (j, column) in values.columns().into_iter().enumerate() {
            let first = column.first().copied().unwrap_or(0.0);
            let is_constant = column.iter().all(|&x| x == first);
            if is_constant {
                mean[j] = first;
                scale[j] = 1.0;
            } else if !(scale[j] > 0.0 && scale[j].is_finite()) {
                scale[j] = 1.0;
            }
        }

        Self {
            names: matrix.names().to_vec(),
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        }
    }


    /// Returns the per-feature means.
    #[inline]
    pub fn mean(&self) -> &[f64] {
        &self.mean[..]
    }


    /// Returns the per-feature scales.
    #[inline]
    pub fn scale(&self) -> &[f64] {
        &self.scale[..]
    }


    /// Returns `(x - mean) / scale` column-wise.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.check_columns(matrix)?;

        let mut values = matrix.values().clone();
        Zip::from(values.columns_mut())
            .and(ArrayView1::from(&self.mean[..]))
            .and(ArrayView1::from(&self.scale[..]))
            .for_each(|mut col, &m, &s| {
                col.mapv_inplace(|x| (x - m) / s);
            });

        FeatureMatrix::new(matrix.names().to_vec(), values)
    }


    /// Returns `scale * x + mean` column-wise.
    pub fn inverse_transform(&self, matrix: &FeatureMatrix)
        -> Result<FeatureMatrix>
    {
        self.check_columns(matrix)?;

        let mut values = matrix.values().clone();
        Zip::from(values.columns_mut())
            .and(ArrayView1::from(&self.mean[..]))
            .and(ArrayView1::from(&self.scale[..]))
            .for_each(|mut col, &m, &s| {
                col.mapv_inplace(|x| s * x + m);
            });

        FeatureMatrix::new(self.names.clone(), values)
    }


    fn check_columns(&self, matrix: &FeatureMatrix) -> Result<()> {
        if matrix.n_cols() != self.mean.len() {
            return Err(SegmentError::LengthMismatch {
                what: "standardized columns",
                expected: self.mean.len(),
                found: matrix.n_cols(),
            });
        }
        Ok(())
    }
}


/// Standardize `matrix`.
/// Returns the scaled matrix with the per-feature mean and scale.
pub fn standardize(matrix: &FeatureMatrix)
    -> (FeatureMatrix, Vec<f64>, Vec<f64>)
{
    let standardizer = Standardizer::fit(matrix);
    let scaled = standardizer.transform(matrix)
        .expect("A standardizer fits the columns it was fitted on");

    let Standardizer { mean, scale, .. } = standardizer;
    (scaled, mean, scale)
}
