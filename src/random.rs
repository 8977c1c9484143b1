//! Random sources and weighted sampling.
//!
//! Every stochastic step of the search draws from a caller-supplied
//! [`Rng`], so a fixed seed reproduces a run exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a seeded random number generator.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws one item from `(item, weight)` pairs with probability
/// proportional to its weight.
///
/// Non-finite and non-positive weights are treated as zero. Returns `None`
/// when the slice is empty or every weight is zero.
pub fn sample_weighted<'a, T, R: Rng>(items: &'a [(T, f64)], rng: &mut R) -> Option<&'a T> {
    let total: f64 = items.iter().map(|(_, w)| sanitize(*w)).sum();
    if items.is_empty() || total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut roll = rng.random_range(0.0..total);
    let mut last_positive = None;
    for (item, weight) in items {
        let w = sanitize(*weight);
        if w <= 0.0 {
            continue;
        }
        last_positive = Some(item);
        if roll < w {
            return Some(item);
        }
        roll -= w;
    }
    // Rounding can leave a sliver of `roll` past the last bucket.
    last_positive
}

/// Converts log-weights into normalized weights, `exp(l_i - max) / sum`.
///
/// Shifting by the maximum keeps large negative priorities from
/// overflowing `exp`.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .filter(|l| l.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f64> = logits
        .iter()
        .map(|&l| if l.is_finite() { (l - max).exp() } else { 0.0 })
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
