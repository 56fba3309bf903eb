//! Weighted aggregation of normalised scores.
//!
//! S(p) = Σ w_i × o_i(p) / Σ w_i, where o_i is the normalised score with
//! `lower_better` criteria inverted as 1 − n.

use serde::ser::{Serialize, Serializer};

use reviewcrew_common::{Criterion, Direction};

use crate::normalise::ScoreMatrix;

/// One product's single-number score under some scoring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductScore {
    pub product_id: String,
    pub score: f64,
}

/// Per-product scores in cohort input order.
/// Serialises as a JSON object keyed by product id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightedScores(Vec<ProductScore>);

impl WeightedScores {
    pub fn new(scores: Vec<ProductScore>) -> Self {
        Self(scores)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductScore> {
        self.0.iter()
    }

    pub fn get(&self, product_id: &str) -> Option<f64> {
        self.0.iter().find(|s| s.product_id == product_id).map(|s| s.score)
    }
}

impl Serialize for WeightedScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|s| (&s.product_id, s.score)))
    }
}

/// Orient a normalised score so that higher is always better.
/// This is the only place criterion direction is applied.
pub fn oriented(normalised: f64, direction: Direction) -> f64 {
    match direction {
        Direction::HigherBetter => normalised,
        Direction::LowerBetter => 1.0 - normalised,
    }
}

/// Aggregate using each criterion's stored weight.
pub fn compute_weighted_scores(matrix: &ScoreMatrix, criteria: &[Criterion]) -> WeightedScores {
    let weights: Vec<f64> = criteria.iter().map(|c| c.weight).collect();
    aggregate_with_weights(matrix, criteria, &weights)
}

/// Aggregate using an explicit weight vector aligned with `criteria`.
/// A zero weight sum yields 0 for every product rather than NaN.
pub fn aggregate_with_weights(
    matrix: &ScoreMatrix,
    criteria: &[Criterion],
    weights: &[f64],
) -> WeightedScores {
    let scores = matrix
        .rows()
        .iter()
        .map(|row| {
            let mut total = 0.0;
            let mut weight_sum = 0.0;
            for (criterion, &w) in criteria.iter().zip(weights) {
                let n = row.scores.get(&criterion.id).copied().unwrap_or(0.0);
                total += oriented(n, criterion.direction) * w;
                weight_sum += w;
            }
            let score = if weight_sum > 0.0 { total / weight_sum } else { 0.0 };
            ProductScore { product_id: row.product_id.clone(), score }
        })
        .collect();
    WeightedScores(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalise::normalize_scores;
    use reviewcrew_common::{Normalization, ProductScoreRecord};

    #[test]
    fn test_lower_better_is_inverted() {
        let criteria = vec![Criterion::new("price", Direction::LowerBetter, Normalization::Minmax, 1.0)];
        let products = vec![
            ProductScoreRecord::new("a").with_score("price", 10.0),
            ProductScoreRecord::new("b").with_score("price", 20.0),
        ];
        let matrix = normalize_scores(&products, &criteria);
        // normalisation itself is direction-agnostic
        assert_eq!(matrix.get("a", "price"), Some(0.0));
        let weighted = compute_weighted_scores(&matrix, &criteria);
        assert_eq!(weighted.get("a"), Some(1.0));
        assert_eq!(weighted.get("b"), Some(0.0));
    }

    #[test]
    fn test_zero_weight_sum_yields_zero() {
        let criteria = vec![
            Criterion::new("c1", Direction::HigherBetter, Normalization::Minmax, 0.0),
            Criterion::new("c2", Direction::LowerBetter, Normalization::Minmax, 0.0),
        ];
        let products = vec![
            ProductScoreRecord::new("a").with_score("c1", 1.0),
            ProductScoreRecord::new("b").with_score("c2", 5.0),
        ];
        let weighted = compute_weighted_scores(&normalize_scores(&products, &criteria), &criteria);
        for s in weighted.iter() {
            assert_eq!(s.score, 0.0);
            assert!(!s.score.is_nan());
        }
    }

    #[test]
    fn test_unnormalised_weights_are_divided_by_sum() {
        let criteria = vec![
            Criterion::new("c1", Direction::HigherBetter, Normalization::None, 3.0),
            Criterion::new("c2", Direction::HigherBetter, Normalization::None, 1.0),
        ];
        let products = vec![ProductScoreRecord::new("a").with_score("c1", 1.0).with_score("c2", 0.0)];
        let weighted = compute_weighted_scores(&normalize_scores(&products, &criteria), &criteria);
        assert!((weighted.get("a").unwrap() - 0.75).abs() < 1e-12);
    }
}
