use rand::prelude::*;
use colored::Colorize;

use std::iter::Iterator;

const WIDTH: usize = 9;


/// A struct that generates
/// pairs of training/test row indices for cross validation.
///
/// The rows are shuffled once by the caller's random generator,
/// and the `i`-th shuffled row is held out in fold `i % n_folds`.
/// Indices in each fold are returned in ascending order.
/// # Example
/// ```
/// use rand::prelude::*;
/// use miniseg::CrossValidation;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let cv = CrossValidation::new(10, 3)
///     .shuffle(&mut rng);
/// let mut held_out = 0;
/// for (train, test) in cv {
///     assert_eq!(train.len() + test.len(), 10);
///     held_out += test.len();
/// }
/// assert_eq!(held_out, 10);
/// ```
#[derive(Debug, Clone)]
pub struct CrossValidation {
    current_fold: usize,
    n_folds: usize,
    ix: Vec<usize>,
    verbose: bool,
}


impl CrossValidation {
    /// Construct a new instance of `CrossValidation`
    /// over `n_sample` rows.
    /// If `n_folds` exceeds `n_sample`, every row is its own fold.
    #[inline]
    pub fn new(n_sample: usize, n_folds: usize) -> Self {
        let ix = (0..n_sample).collect::<Vec<_>>();
        Self {
            current_fold: 0,
            n_folds: n_folds.min(n_sample).max(1),
            verbose: false,
            ix,
        }
    }


    /// Set the verbose parameter.
    /// If `true`, `CrossValidation` prints some information
    /// when generating a train/test pair.
    /// Default vaule is `false.`
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Shuffle the rows with `rng`.
    /// By default, `CrossValidation` does not shuffle the rows.
    #[inline]
    pub fn shuffle<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.ix.shuffle(rng);
        self
    }


    /// Returns the number of folds.
    #[inline]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }


    /// Returns the training/test rows for `i`th fold.
    #[inline]
    fn fold_at(&self, i: usize) -> (Vec<usize>, Vec<usize>) {
        let mut train = Vec::with_capacity(self.ix.len());
        let mut test = Vec::with_capacity(self.ix.len() / self.n_folds + 1);
        for (k, &row) in self.ix.iter().enumerate() {
            if k % self.n_folds == i { test.push(row); } else { train.push(row); }
        }
        test.sort_unstable();
        train.sort_unstable();
        (train, test)
    }
}


impl Iterator for CrossValidation {
    type Item = (Vec<usize>, Vec<usize>);
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_fold >= self.n_folds { return None; }

        let output = self.fold_at(self.current_fold);
        self.current_fold += 1;

        if self.verbose {
            let train_size = output.0.len();
            let test_size = output.1.len();
            println!(
                "{}    {}    {}",
                format!("  [{: >3}'th fold]", self.current_fold).bold().red(),
                format!("[TRAIN {:>WIDTH$}]", train_size).bold().green(),
                format!("[TEST {:>WIDTH$}]", test_size).bold().yellow(),
            );
        }

        Some(output)
    }
}
