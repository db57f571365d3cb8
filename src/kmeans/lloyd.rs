use ndarray::{Array2, ArrayView1, Axis};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::{FeatureMatrix, Result, SegmentError, Warning};
use crate::common::{checker, utils};
use super::fit::KMeansFit;
use super::init::Init;


/// The maximal number of Lloyd iterations set as default.
pub const DEFAULT_MAX_ITER: usize = 300;
/// The convergence tolerance set as default.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// The number of restarts set as default.
pub const DEFAULT_N_INIT: usize = 1;


/// Lloyd's k-means on the rows of a [`FeatureMatrix`].
///
/// # Example
///
/// ```no_run
/// use miniseg::prelude::*;
/// use rand::prelude::*;
///
/// # fn run(scaled: &FeatureMatrix) -> miniseg::Result<()> {
/// let mut rng = StdRng::seed_from_u64(1234);
/// let fit = KMeans::new(4)
///     .n_init(10)
///     .init(Init::KMeansPlusPlus)
///     .fit(scaled, &mut rng)?;
///
/// println!("objective: {}", fit.total_within_ss());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    tolerance: f64,
    n_init: usize,
    init: Init,
}


impl KMeans {
    /// Construct a new instance of [`KMeans`] with `k` clusters.
    /// By default, [`KMeans`] sets the parameters as follows;
    /// ```text
    /// max_iter: DEFAULT_MAX_ITER == 300,
    /// tolerance: DEFAULT_TOLERANCE == 1e-4,
    /// n_init: DEFAULT_N_INIT == 1,
    /// init: Init::KMeansPlusPlus,
    /// ```
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            n_init: DEFAULT_N_INIT,
            init: Init::KMeansPlusPlus,
        }
    }


    /// Set the number of clusters.
    #[inline]
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }


    /// Set the maximal number of iterations of each run.
    #[inline]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }


    /// Set the convergence tolerance on the objective improvement.
    #[inline]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }


    /// Set the number of restarts.
    /// The run with the smallest objective is kept.
    #[inline]
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }


    /// Set the seeding strategy.
    #[inline]
    pub fn init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }


    fn check(&self, n_rows: usize) -> Result<()> {
        checker::check_n_clusters(self.k, n_rows)?;
        checker::check_non_negative("tolerance", self.tolerance)?;
        if self.max_iter == 0 || self.n_init == 0 {
            return Err(SegmentError::InvalidParameter(
                "max_iter and n_init must be positive".to_string()
            ));
        }
        Ok(())
    }


    /// Cluster the rows of `matrix`.
    ///
    /// `rng` drives the seeding of every restart,
    /// so equal inputs and equal generator states give equal fits.
    pub fn fit<R>(&self, matrix: &FeatureMatrix, rng: &mut R)
        -> Result<KMeansFit>
        where R: Rng + ?Sized
    {
        self.check(matrix.n_rows())?;

        let x = matrix.values();
        let mut best: Option<Run> = None;
        for _ in 0..self.n_init {
            let run = self.run_once(x, rng);
            let better = best.as_ref()
                .map_or(true, |b| run.objective < b.objective);
            if better { best = Some(run); }
        }
        let best = best.expect("At least one restart is performed");
        debug!(
            "k-means (k = {}) objective {:.6} after {} iterations",
            self.k, best.objective, best.n_iter,
        );

        best.warnings.iter().for_each(Warning::emit);

        let (labels, centroids) = canonicalize(&best.labels, &best.centroids);
        KMeansFit::new(
            matrix, &labels, centroids,
            best.n_iter, best.converged, best.warnings,
        )
    }


    /// A single run of Lloyd's algorithm from a fresh seeding.
    /// Returns the best iterate seen.
    fn run_once<R>(&self, x: &Array2<f64>, rng: &mut R) -> Run
        where R: Rng + ?Sized
    {
        let k = self.k;
        let mut centroids = self.init.centroids(x, k, rng);
        let (mut labels, mut d2) = assign(x, &centroids);
        let mut objective = d2.iter().sum::<f64>();

        let mut best = Run {
            labels: labels.clone(),
            centroids: centroids.clone(),
            objective,
            n_iter: 0,
            converged: false,
            warnings: Vec::new(),
        };
        let mut warnings = Vec::new();

        for iteration in 1..=self.max_iter {
            // Update step, then move every empty centroid
            // onto the row farthest from its own centroid.
            let (updated, empty) = update(x, &labels, &centroids);
            centroids = updated;

            let mut reseeded = false;
            for centroid in empty {
                let Some(row) = farthest(&d2) else {
                    debug!(
                        "k-means (k = {k}) kept empty centroid {centroid} \
                         at iteration {iteration}; every row sits on a centroid"
                    );
                    continue;
                };
                reseeded = true;
                centroids.row_mut(centroid).assign(&x.row(row));
                d2[row] = f64::NEG_INFINITY;
                warnings.push(Warning::EmptyClusterReseeded {
                    k, centroid, row, iteration,
                });
            }

            let (new_labels, new_d2) = assign(x, &centroids);
            let new_objective = new_d2.iter().sum::<f64>();
            let changed = new_labels != labels;
            let improvement = objective - new_objective;

            labels = new_labels;
            d2 = new_d2;
            objective = new_objective;

            best.n_iter = iteration;
            if objective < best.objective {
                best.labels = labels.clone();
                best.centroids = centroids.clone();
                best.objective = objective;
            }

            if !changed || (!reseeded && improvement < self.tolerance) {
                best.converged = true;
                break;
            }
        }

        if !best.converged {
            warnings.push(Warning::NonConvergence {
                k, iterations: best.n_iter,
            });
        }
        best.warnings = warnings;
        best
    }
}


struct Run {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    objective: f64,
    n_iter: usize,
    converged: bool,
    warnings: Vec<Warning>,
}


/// Returns the index of the centroid nearest to `row`
/// and the squared distance to it.
/// Ties go to the lowest index.
pub(super) fn nearest(row: ArrayView1<'_, f64>, centroids: &Array2<f64>)
    -> (usize, f64)
{
    centroids.rows()
        .into_iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_d), (c, centroid)| {
            let d = utils::squared_distance(row.iter(), centroid.iter());
            if d < best_d { (c, d) } else { (best, best_d) }
        })
}


/// Returns the row farthest from its centroid,
/// or `None` if every row sits on one.
/// Ties go to the lowest row.
fn farthest(d2: &[f64]) -> Option<usize> {
    d2.iter()
        .enumerate()
        .filter(|(_, &d)| d > 0.0)
        .fold(None, |far: Option<(usize, f64)>, (i, &d)| match far {
            Some((_, best)) if best >= d => far,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}


/// Assignment step.
/// Rows are processed in parallel and collected in row order.
fn assign(x: &Array2<f64>, centroids: &Array2<f64>) -> (Vec<usize>, Vec<f64>) {
    (0..x.nrows())
        .into_par_iter()
        .map(|i| nearest(x.row(i), centroids))
        .collect::<Vec<_>>()
        .into_iter()
        .unzip()
}


/// Update step.
/// Returns the new centroids and the clusters left empty,
/// whose centroids are kept from `previous`.
fn update(x: &Array2<f64>, labels: &[usize], previous: &Array2<f64>)
    -> (Array2<f64>, Vec<usize>)
{
    let k = previous.nrows();
    let mut sums = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0_usize; k];
    for (row, &c) in x.rows().into_iter().zip(labels) {
        let mut sum = sums.row_mut(c);
        sum += &row;
        counts[c] += 1;
    }

    let mut empty = Vec::new();
    for (c, mut sum) in sums.axis_iter_mut(Axis(0)).enumerate() {
        if counts[c] == 0 {
            sum.assign(&previous.row(c));
            empty.push(c);
        } else {
            sum /= counts[c] as f64;
        }
    }
    (sums, empty)
}


/// Renumber the clusters by first appearance in row order.
/// Clusters that no row reaches keep their relative order at the end.
fn canonicalize(labels: &[usize], centroids: &Array2<f64>)
    -> (Vec<usize>, Array2<f64>)
{
    let k = centroids.nrows();
    let mut order = Vec::with_capacity(k);
    let mut seen = vec![false; k];
    for &c in labels {
        if !seen[c] {
            seen[c] = true;
            order.push(c);
        }
    }
    order.extend((0..k).filter(|&c| !seen[c]));

    let mut new_id = vec![0; k];
    order.iter().enumerate().for_each(|(new, &old)| { new_id[old] = new; });

    let labels = labels.iter().map(|&c| new_id[c]).collect();
    let centroids = centroids.select(Axis(0), &order);
    (labels, centroids)
}
