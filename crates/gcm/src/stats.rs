//! Small numeric helpers shared by mechanisms and attribution.

use ndarray::ArrayView1;
use rand::seq::SliceRandom;
use rand::Rng;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: ArrayView1<'_, f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sum() / values.len() as f64
}

/// Population variance (n denominator). Zero for fewer than two values.
pub fn variance(values: ArrayView1<'_, f64>) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: ArrayView1<'_, f64>) -> f64 {
    variance(values).sqrt()
}

/// A uniformly random permutation of `0..n`.
pub fn permuted_indices(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}
