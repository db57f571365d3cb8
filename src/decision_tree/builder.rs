use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::{Result, SegmentError};
use crate::common::checker;
use crate::sample::{Dataset, FeatureSpec};
use super::criterion::Criterion;
use super::cp_table::{CpRow, CpTable, PruneRule};
use super::cross_validation::CrossValidation;
use super::segmenter::DecisionTreeSegmenter;
use super::tree::{Grower, Tree, prune_at};


/// The minimal number of records a node needs to be split, set as default.
pub const DEFAULT_MIN_SPLIT: usize = 20;
/// The minimal number of records in a leaf, set as default.
pub const DEFAULT_MIN_BUCKET: usize = 7;
/// The maxmial depth set as default.
pub const DEFAULT_MAX_DEPTH: usize = 30;
/// The number of cross-validation folds set as default.
pub const DEFAULT_N_FOLDS: usize = 10;
/// The complexity floor set as default.
pub const DEFAULT_COMPLEXITY_FLOOR: f64 = 0.01;


/// A struct that grows, cross-validates and prunes
/// a classification tree into a [`DecisionTreeSegmenter`].
///
/// # Example
///
/// ```no_run
/// use miniseg::prelude::*;
/// use rand::prelude::*;
///
/// # fn run(dataset: &Dataset) -> miniseg::Result<()> {
/// let mut rng = StdRng::seed_from_u64(1234);
/// let segmenter = DecisionTreeBuilder::new(vec![
///         FeatureSpec::categorical("Contract"),
///         FeatureSpec::numeric("MonthlyCharges"),
///     ])
///     .complexity_floor(0.001)
///     .criterion(Criterion::Gini)
///     .fit(dataset, &mut rng)?;
///
/// println!("{segmenter}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DecisionTreeBuilder {
    predictors: Vec<FeatureSpec>,
    complexity_floor: f64,
    min_split: usize,
    min_bucket: usize,
    max_depth: usize,
    n_folds: usize,
    criterion: Criterion,
    prune_rule: PruneRule,
    verbose: bool,
}


impl DecisionTreeBuilder {
    /// Construct a new instance of [`DecisionTreeBuilder`]
    /// over the ordered `predictors`.
    /// By default, [`DecisionTreeBuilder`] sets the parameters as follows;
    /// ```text
    /// complexity_floor: DEFAULT_COMPLEXITY_FLOOR == 0.01,
    /// min_split: DEFAULT_MIN_SPLIT == 20,
    /// min_bucket: DEFAULT_MIN_BUCKET == 7,
    /// max_depth: DEFAULT_MAX_DEPTH == 30,
    /// n_folds: DEFAULT_N_FOLDS == 10,
    /// criterion: Criterion::Gini,
    /// prune_rule: PruneRule::MinXError,
    /// ```
    pub fn new(predictors: Vec<FeatureSpec>) -> Self {
        Self {
            predictors,
            complexity_floor: DEFAULT_COMPLEXITY_FLOOR,
            min_split: DEFAULT_MIN_SPLIT,
            min_bucket: DEFAULT_MIN_BUCKET,
            max_depth: DEFAULT_MAX_DEPTH,
            n_folds: DEFAULT_N_FOLDS,
            criterion: Criterion::Gini,
            prune_rule: PruneRule::MinXError,
            verbose: false,
        }
    }


    /// Set the complexity floor.
    /// Subtrees whose relative complexity parameter
    /// is below this value are never candidates.
    #[inline]
    pub fn complexity_floor(mut self, complexity_floor: f64) -> Self {
        self.complexity_floor = complexity_floor;
        self
    }


    /// Set the minimal number of records a node needs to be split.
    #[inline]
    pub fn min_split(mut self, min_split: usize) -> Self {
        self.min_split = min_split;
        self
    }


    /// Set the minimal number of records in each child of a split.
    #[inline]
    pub fn min_bucket(mut self, min_bucket: usize) -> Self {
        self.min_bucket = min_bucket;
        self
    }


    /// Specify the maximal depth of the tree.
    /// The root has depth `0`.
    #[inline]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }


    /// Set the number of cross-validation folds.
    #[inline]
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the node splitting rule.
    /// Default value is `Criterion::Gini`.
    #[inline]
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }


    /// Set how the CP table row is chosen.
    /// Default value is `PruneRule::MinXError`.
    #[inline]
    pub fn prune_rule(mut self, prune_rule: PruneRule) -> Self {
        self.prune_rule = prune_rule;
        self
    }


    /// Print the cross-validation folds while fitting.
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    fn check(&self) -> Result<()> {
        checker::check_non_negative("complexity_floor", self.complexity_floor)?;
        checker::check_n_folds(self.n_folds)?;
        if self.predictors.is_empty() {
            return Err(SegmentError::InvalidParameter(
                "the tree needs at least one predictor".to_string()
            ));
        }
        if self.min_bucket == 0 {
            return Err(SegmentError::InvalidParameter(
                "min_bucket must be positive".to_string()
            ));
        }
        Ok(())
    }


    /// Grow the full tree on `dataset`,
    /// build and cross-validate its CP table,
    /// and prune it at the row chosen by the prune rule.
    ///
    /// `rng` only shuffles the records into folds.
    pub fn fit<R>(&self, dataset: &Dataset, rng: &mut R)
        -> Result<DecisionTreeSegmenter>
        where R: Rng + ?Sized
    {
        self.check()?;
        let positions = dataset.resolve(&self.predictors)?;
        let grower = Grower {
            positions,
            criterion: self.criterion,
            min_split: self.min_split,
            min_bucket: self.min_bucket,
            max_depth: self.max_depth,
        };


        let n_sample = dataset.shape().0;
        let full = grower.grow(dataset, (0..n_sample).collect());
        let sequence = full.pruning_sequence();
        let r_root = full.node(full.root()).loss_as_leaf();
        debug!(
            "grew a tree with {} leaves; pruning sequence has {} subtrees",
            full.n_leaves(), sequence.len(),
        );


        // The candidate is the largest subtree within the floor.
        let floor = self.complexity_floor;
        let first = sequence.iter()
            .rposition(|(alpha, _)| *alpha <= floor * r_root)
            .unwrap_or(0);
        let candidates = sequence[first..].iter()
            .rev()
            .collect::<Vec<_>>();
        let cps = candidates.iter()
            .map(|(alpha, _)| {
                if r_root > 0.0 { (alpha / r_root).max(floor) } else { floor }
            })
            .collect::<Vec<_>>();


        let errors = self.cross_validate(dataset, &grower, &cps, rng);
        let relative = |x: f64| if r_root > 0.0 { x / r_root } else { 0.0 };
        let n = n_sample as f64;
        let rows = candidates.iter()
            .zip(cps)
            .zip(errors)
            .map(|(((_, tree), cp), e)| {
                let e = e as f64;
                let xstd = (e - e * e / n).max(0.0).sqrt();
                CpRow {
                    cp,
                    n_split: tree.n_splits(),
                    rel_error: relative(tree.risk()),
                    xerror: relative(e),
                    xstd: relative(xstd),
                }
            })
            .collect::<Vec<_>>();
        let cp_table = CpTable::new(rows, self.prune_rule);
        debug!(
            "selected CP row {} of {} ({} splits)",
            cp_table.selected_index() + 1,
            cp_table.rows().len(),
            cp_table.selected().n_split,
        );


        let tree = candidates[cp_table.selected_index()].1.clone();
        Ok(DecisionTreeSegmenter::new(
            self.predictors.clone(), tree, cp_table
        ))
    }


    /// Returns the total held-out misclassifications
    /// of each CP row.
    ///
    /// Folds are fitted in parallel and combined in fold order.
    fn cross_validate<R>(
        &self,
        dataset: &Dataset,
        grower: &Grower,
        cps: &[f64],
        rng: &mut R,
    ) -> Vec<usize>
        where R: Rng + ?Sized
    {
        // Each row is represented by the geometric mean
        // of its cp and the next larger one.
        let representatives = cps.iter()
            .enumerate()
            .map(|(j, &cp)| {
                if j == 0 { f64::INFINITY } else { (cp * cps[j - 1]).sqrt() }
            })
            .collect::<Vec<_>>();

        let target = dataset.target();
        let folds = CrossValidation::new(dataset.shape().0, self.n_folds)
            .verbose(self.verbose)
            .shuffle(rng)
            .collect::<Vec<_>>();

        let per_fold = folds.into_par_iter()
            .map(|(train, test)| {
                let tree = grower.grow(dataset, train);
                let sequence = tree.pruning_sequence();
                let r_fold = tree.node(tree.root()).loss_as_leaf();

                representatives.iter()
                    .map(|&cp| {
                        let pruned = fold_subtree(&sequence, cp, r_fold);
                        test.iter()
                            .filter(|&&i| pruned.predict(dataset, i) != target[i])
                            .count()
                    })
                    .collect::<Vec<usize>>()
            })
            .collect::<Vec<_>>();

        let mut errors = vec![0_usize; cps.len()];
        for fold in per_fold {
            errors.iter_mut()
                .zip(fold)
                .for_each(|(total, e)| { *total += e; });
        }
        errors
    }
}


/// Returns the subtree of a fold's pruning sequence
/// at the relative complexity `cp`.
fn fold_subtree(sequence: &[(f64, Tree)], cp: f64, r_fold: f64) -> &Tree {
    let alpha = if cp.is_infinite() { f64::INFINITY } else { cp * r_fold };
    prune_at(sequence, alpha)
}
