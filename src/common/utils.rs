//! This file provides some common statistics
//! such as mean, variance, and quantiles.


/// Returns the arithmetic mean, or `0` for an empty slice.
#[inline(always)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { return 0.0; }
    values.iter().sum::<f64>() / values.len() as f64
}


/// Returns the sample variance (`n - 1` denominator).
/// Fewer than two values have zero variance.
#[inline(always)]
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 { return 0.0; }

    let m = mean(values);
    values.iter()
        .map(|x| (x - m).powi(2))
        .sum::<f64>()
        / (n - 1) as f64
}


/// Returns the sample standard deviation.
#[inline(always)]
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}


/// Returns the `q`-quantile of `values`
/// with linear interpolation between order statistics
/// (Hyndman & Fan type 7).
pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let value = sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]);
    Some(value)
}


/// Returns the squared Euclidean distance between two points.
#[inline(always)]
pub(crate) fn squared_distance<'a, I, J>(x: I, y: J) -> f64
    where I: IntoIterator<Item = &'a f64>,
          J: IntoIterator<Item = &'a f64>,
{
    x.into_iter()
        .zip(y)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
}
