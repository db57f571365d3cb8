//! Recoverable conditions reported alongside the output.
use serde::Serialize;
use tracing::warn;

use std::fmt;


/// A recoverable condition.
/// None of these stops a run; each is logged through `tracing`
/// and returned with the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// K-means reached its iteration cap before stabilizing.
    /// The best iterate found was returned.
    NonConvergence {
        /// Number of clusters.
        k: usize,
        /// Iterations performed.
        iterations: usize,
    },


    /// An update step left a cluster empty,
    /// so its centroid was moved onto a record.
    EmptyClusterReseeded {
        /// Number of clusters.
        k: usize,
        /// Zero-based index of the emptied centroid.
        centroid: usize,
        /// Row the centroid was moved to.
        row: usize,
        /// Iteration at which it happened.
        iteration: usize,
    },


    /// The elbow curve increased from `k - 1` to `k`.
    /// This is a convergence artifact of the heuristic, not of the objective.
    ElbowNotMonotone {
        /// Cluster count whose objective increased.
        k: usize,
        /// Objective at `k - 1`.
        previous: f64,
        /// Objective at `k`.
        current: f64,
    },
}


impl Warning {
    /// Emit this warning through `tracing`.
    pub(crate) fn emit(&self) {
        warn!("{self}");
    }
}


impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonConvergence { k, iterations } => {
                write!(
                    f,
                    "k-means (k = {k}) did not converge \
                     within {iterations} iterations"
                )
            },
            Self::EmptyClusterReseeded { k, centroid, row, iteration } => {
                write!(
                    f,
                    "k-means (k = {k}) emptied centroid {centroid} \
                     at iteration {iteration}; reseeded at row {row}"
                )
            },
            Self::ElbowNotMonotone { k, previous, current } => {
                write!(
                    f,
                    "elbow curve increased at k = {k} \
                     ({previous:.4} -> {current:.4}); convergence artifact"
                )
            },
        }
    }
}
