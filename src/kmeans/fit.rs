use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::{FeatureMatrix, Result, Standardizer, Warning};
use crate::common::utils;
use crate::segment::{SegmentAssignment, SegmentId};


/// The output of [`KMeans::fit`](super::KMeans::fit).
///
/// Cluster `c` (1-based) is row `c - 1` of the centroids.
/// Ids are numbered by first appearance in row order.
#[derive(Debug, Clone, Serialize)]
pub struct KMeansFit {
    pub(super) names: Vec<String>,
    #[serde(skip)]
    pub(super) assignment: SegmentAssignment,
    #[serde(skip)]
    pub(super) centroids: Array2<f64>,
    pub(super) sizes: Vec<usize>,
    pub(super) within_ss: Vec<f64>,
    pub(super) total_within_ss: f64,
    pub(super) total_ss: f64,
    pub(super) between_ss: f64,
    pub(super) n_iter: usize,
    pub(super) converged: bool,
    pub(super) warnings: Vec<Warning>,
}


impl KMeansFit {
    /// Summarize the final labels and centroids of a run.
    /// `labels` are zero-based and already canonical.
    pub(super) fn new(
        x: &FeatureMatrix,
        labels: &[usize],
        centroids: Array2<f64>,
        n_iter: usize,
        converged: bool,
        warnings: Vec<Warning>,
    ) -> Result<Self>
    {
        let k = centroids.nrows();
        let values = x.values();

        let mut sizes = vec![0_usize; k];
        let mut within_ss = vec![0.0; k];
        for (row, &c) in values.rows().into_iter().zip(labels) {
            sizes[c] += 1;
            within_ss[c] += utils::squared_distance(
                row.iter(), centroids.row(c).iter()
            );
        }
        let total_within_ss = within_ss.iter().sum::<f64>();

        let grand_mean = values.mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(values.ncols()));
        let total_ss = values.rows()
            .into_iter()
            .map(|row| utils::squared_distance(row.iter(), grand_mean.iter()))
            .sum::<f64>();
        let between_ss = total_ss - total_within_ss;

        let ids = labels.iter().map(|&c| SegmentId(c + 1)).collect();
        let assignment = SegmentAssignment::new(
            crate::SegmentMethod::Cluster, ids, k
        )?;

        Ok(Self {
            names: x.names().to_vec(),
            assignment,
            centroids,
            sizes,
            within_ss,
            total_within_ss,
            total_ss,
            between_ss,
            n_iter,
            converged,
            warnings,
        })
    }


    /// Returns the number of clusters.
    #[inline]
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }


    /// Returns the cluster of each row.
    #[inline]
    pub fn assignment(&self) -> &SegmentAssignment {
        &self.assignment
    }


    /// Returns the centroids in the space of the fitted matrix.
    #[inline]
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }


    /// Returns the centroids mapped back to the raw scale.
    pub fn centroids_unscaled(&self, standardizer: &Standardizer)
        -> Result<FeatureMatrix>
    {
        let scaled = FeatureMatrix::new(
            self.names.clone(), self.centroids.clone()
        )?;
        standardizer.inverse_transform(&scaled)
    }


    /// Returns the number of rows in each cluster.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes[..]
    }


    /// Returns the within-cluster sum of squares of each cluster.
    #[inline]
    pub fn within_ss(&self) -> &[f64] {
        &self.within_ss[..]
    }


    /// Returns the k-means objective.
    #[inline]
    pub fn total_within_ss(&self) -> f64 {
        self.total_within_ss
    }


    /// Returns the sum of squares around the grand mean.
    #[inline]
    pub fn total_ss(&self) -> f64 {
        self.total_ss
    }


    /// Returns `total_ss - total_within_ss`.
    #[inline]
    pub fn between_ss(&self) -> f64 {
        self.between_ss
    }


    /// Returns the number of Lloyd iterations of the chosen run.
    #[inline]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }


    /// Returns `false` if the chosen run hit the iteration cap.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }


    /// Returns the recoverable conditions met by the chosen run.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings[..]
    }


    /// Returns the cluster whose centroid is nearest to `row`.
    /// Ties go to the lowest cluster id.
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> SegmentId {
        let (c, _) = super::lloyd::nearest(row, &self.centroids);
        SegmentId(c + 1)
    }
}
