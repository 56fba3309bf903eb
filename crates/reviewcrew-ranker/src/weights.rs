//! Criterion weight handling.
//!
//! Stored weights need not sum to 1.0; the effective weights used for
//! aggregation are always the stored weights divided by their sum.

use reviewcrew_common::{Criterion, ReviewError, Result};

const SUM_TOLERANCE: f64 = 1e-6;

/// Validate that all weights sum to ~1.0
pub fn validate(criteria: &[Criterion]) -> bool {
    let sum: f64 = criteria.iter().map(|c| c.weight).sum();
    (sum - 1.0).abs() < SUM_TOLERANCE
}

/// Renormalise weights in place so they sum to 1.0.
/// Fails when every weight is zero: there is nothing to scale.
pub fn renormalise(criteria: &mut [Criterion]) -> Result<()> {
    let sum: f64 = criteria.iter().map(|c| c.weight).sum();
    if sum <= 0.0 {
        return Err(ReviewError::Config(
            "criterion weights sum to zero; cannot renormalise".into(),
        ));
    }
    for c in criteria.iter_mut() {
        c.weight /= sum;
    }
    Ok(())
}

/// Effective weight vector, in criterion order. All zeros when the stored
/// weights sum to zero, which downstream aggregation turns into a 0 score.
pub fn effective_weights(criteria: &[Criterion]) -> Vec<f64> {
    let raw: Vec<f64> = criteria.iter().map(|c| c.weight).collect();
    rescale(raw)
}

/// Scale one weight by `factor` (floored at zero) and renormalise the vector.
pub fn perturbed(base: &[f64], index: usize, factor: f64) -> Vec<f64> {
    let mut w = base.to_vec();
    if let Some(slot) = w.get_mut(index) {
        *slot = (*slot * factor).max(0.0);
    }
    rescale(w)
}

fn rescale(mut w: Vec<f64>) -> Vec<f64> {
    let sum: f64 = w.iter().sum();
    if sum > 0.0 {
        w.iter_mut().for_each(|x| *x /= sum);
    }
    w
}
