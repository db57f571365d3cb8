//! This file defines some functions that checks some pre-conditions
//! E.g., the number of clusters, the number of folds.

use crate::{Result, SegmentError};


/// Check whether the number of clusters is valid for `n_sample` rows.
#[inline(always)]
pub(crate) fn check_n_clusters(k: usize, n_sample: usize) -> Result<()> {
    if k == 0 {
        return Err(SegmentError::InvalidParameter(
            "the number of clusters must be positive".into()
        ));
    }
    if k > n_sample {
        return Err(SegmentError::InvalidParameter(format!(
            "the number of clusters ({k}) exceeds \
             the number of rows ({n_sample})"
        )));
    }
    Ok(())
}


/// Check whether the number of folds is valid.
#[inline(always)]
pub(crate) fn check_n_folds(n_folds: usize) -> Result<()> {
    if n_folds < 2 {
        return Err(SegmentError::InvalidParameter(format!(
            "cross-validation needs at least 2 folds, got {n_folds}"
        )));
    }
    Ok(())
}


/// Check whether `value` is a finite, non-negative number.
#[inline(always)]
pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SegmentError::InvalidParameter(format!(
            "`{name}` must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}


/// Check whether `q` lies in `[0, 1]`.
#[inline(always)]
pub(crate) fn check_probability(name: &str, q: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&q) {
        return Err(SegmentError::InvalidParameter(format!(
            "`{name}` must lie in [0, 1], got {q}"
        )));
    }
    Ok(())
}
