//! Seeding strategies for k-means.
use ndarray::{Array2, Axis};
use rand::prelude::*;
use rand::distributions::WeightedIndex;
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::common::utils;


/// How the initial centroids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Init {
    /// k-means++: each further centroid is a row drawn with probability
    /// proportional to its squared distance to the nearest chosen one.
    #[serde(rename = "kmeans_plus_plus")]
    KMeansPlusPlus,
    /// `k` distinct rows drawn uniformly.
    RandomRows,
}


impl fmt::Display for Init {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KMeansPlusPlus => "k-means++",
            Self::RandomRows => "random rows",
        };
        write!(f, "{name}")
    }
}


impl Init {
    /// Returns `k` initial centroids, one per row.
    /// `k` must not exceed the number of rows.
    pub(super) fn centroids<R>(&self, x: &Array2<f64>, k: usize, rng: &mut R)
        -> Array2<f64>
        where R: Rng + ?Sized
    {
        let rows = match self {
            Self::KMeansPlusPlus => plus_plus(x, k, rng),
            Self::RandomRows => {
                rand::seq::index::sample(rng, x.nrows(), k).into_vec()
            },
        };
        x.select(Axis(0), &rows)
    }
}


fn plus_plus<R>(x: &Array2<f64>, k: usize, rng: &mut R) -> Vec<usize>
    where R: Rng + ?Sized
{
    let n_rows = x.nrows();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n_rows));

    let mut d2 = vec![f64::INFINITY; n_rows];
    while chosen.len() < k {
        let last = x.row(chosen[chosen.len() - 1]);
        d2.iter_mut()
            .zip(x.rows())
            .for_each(|(d, row)| {
                *d = d.min(utils::squared_distance(row.iter(), last.iter()));
            });

        // All remaining rows coincide with a centroid.
        let next = match WeightedIndex::new(&d2) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..n_rows),
        };
        chosen.push(next);
    }
    chosen
}
