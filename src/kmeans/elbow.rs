use rand::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{FeatureMatrix, Result, SegmentError, Warning};
use super::lloyd::KMeans;


/// The k-means objective for one cluster count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElbowPoint {
    /// Number of clusters.
    pub k: usize,
    /// Total within-cluster sum of squares.
    pub total_within_ss: f64,
}


/// The k-means objective for `k = 1..=k_max`.
///
/// The objective of exact k-means never increases with `k`.
/// Lloyd's heuristic may still produce an increase;
/// such points are kept as computed and reported
/// as [`Warning::ElbowNotMonotone`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElbowCurve {
    points: Vec<ElbowPoint>,
    warnings: Vec<Warning>,
}


impl ElbowCurve {
    /// Returns the points ordered by `k`.
    #[inline]
    pub fn points(&self) -> &[ElbowPoint] {
        &self.points[..]
    }


    /// Returns the warnings of every fit, then the monotonicity warnings.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings[..]
    }


    /// Returns `true` if the objective never increases.
    pub fn is_monotone(&self) -> bool {
        !self.warnings.iter()
            .any(|w| matches!(w, Warning::ElbowNotMonotone { .. }))
    }
}


impl KMeans {
    /// Compute the elbow curve of `matrix` with these parameters.
    ///
    /// Each `k` is fitted with a fresh `StdRng::seed_from_u64(seed)`.
    /// The fits run in parallel and are collected in `k` order.
    pub fn elbow_curve(&self, matrix: &FeatureMatrix, k_max: usize, seed: u64)
        -> Result<ElbowCurve>
    {
        if k_max == 0 || k_max > matrix.n_rows() {
            return Err(SegmentError::InvalidParameter(format!(
                "k_max must lie in 1..={}, got {k_max}",
                matrix.n_rows()
            )));
        }

        let fits = (1..=k_max)
            .into_par_iter()
            .map(|k| {
                let mut rng = StdRng::seed_from_u64(seed);
                self.k(k).fit(matrix, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;


        let mut warnings = fits.iter()
            .flat_map(|fit| fit.warnings().iter().cloned())
            .collect::<Vec<_>>();
        let points = fits.iter()
            .map(|fit| ElbowPoint { k: fit.k(), total_within_ss: fit.total_within_ss() })
            .collect::<Vec<_>>();

        for pair in points.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            let slack = 1e-12 * previous.total_within_ss.abs().max(1.0);
            if current.total_within_ss > previous.total_within_ss + slack {
                let warning = Warning::ElbowNotMonotone {
                    k: current.k,
                    previous: previous.total_within_ss,
                    current: current.total_within_ss,
                };
                warning.emit();
                warnings.push(warning);
            }
        }
        debug!("computed the elbow curve for k = 1..={k_max}");

        Ok(ElbowCurve { points, warnings })
    }
}


/// Compute the elbow curve of `matrix`
/// with the default k-means parameters.
/// See [`KMeans::elbow_curve`].
pub fn elbow_curve(matrix: &FeatureMatrix, k_max: usize, seed: u64)
    -> Result<ElbowCurve>
{
    KMeans::new(1).elbow_curve(matrix, k_max, seed)
}
