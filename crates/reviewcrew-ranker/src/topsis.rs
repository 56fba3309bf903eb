//! TOPSIS closeness coefficients.
//!
//! The decision matrix is the cohort-normalised score matrix with direction
//! applied (every column is benefit-oriented), scaled by the effective
//! weights. The ideal and anti-ideal solutions are the column maximum and
//! minimum; closeness is C = d⁻ / (d⁺ + d⁻).

use reviewcrew_common::Criterion;

use crate::normalise::ScoreMatrix;
use crate::scorer::{oriented, ProductScore, WeightedScores};

/// Closeness coefficient for each product using an explicit weight vector
/// aligned with `criteria`.
///
/// Zero total weight gives every product 0, matching weighted aggregation.
/// A product equidistant from nothing (every product identical) gets 0.5.
pub fn closeness_with_weights(
    matrix: &ScoreMatrix,
    criteria: &[Criterion],
    weights: &[f64],
) -> WeightedScores {
    let weight_sum: f64 = weights.iter().take(criteria.len()).sum();
    if weight_sum <= 0.0 {
        return WeightedScores::new(
            matrix
                .rows()
                .iter()
                .map(|r| ProductScore { product_id: r.product_id.clone(), score: 0.0 })
                .collect(),
        );
    }

    let weighted: Vec<Vec<f64>> = matrix
        .rows()
        .iter()
        .map(|row| {
            criteria
                .iter()
                .zip(weights)
                .map(|(c, &w)| {
                    let n = row.scores.get(&c.id).copied().unwrap_or(0.0);
                    oriented(n, c.direction) * (w / weight_sum)
                })
                .collect()
        })
        .collect();

    let columns = criteria.len().min(weights.len());
    let mut ideal = vec![f64::NEG_INFINITY; columns];
    let mut anti_ideal = vec![f64::INFINITY; columns];
    for values in &weighted {
        for (j, &v) in values.iter().enumerate() {
            ideal[j] = ideal[j].max(v);
            anti_ideal[j] = anti_ideal[j].min(v);
        }
    }

    let scores = matrix
        .rows()
        .iter()
        .zip(&weighted)
        .map(|(row, values)| {
            let d_plus = distance(values, &ideal);
            let d_minus = distance(values, &anti_ideal);
            let score = if d_plus + d_minus > 0.0 { d_minus / (d_plus + d_minus) } else { 0.5 };
            ProductScore { product_id: row.product_id.clone(), score }
        })
        .collect();

    WeightedScores::new(scores)
}

pub fn compute_closeness(matrix: &ScoreMatrix, criteria: &[Criterion]) -> WeightedScores {
    let weights: Vec<f64> = criteria.iter().map(|c| c.weight).collect();
    closeness_with_weights(matrix, criteria, &weights)
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}
