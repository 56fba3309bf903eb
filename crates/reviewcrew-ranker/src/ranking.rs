//! Ranking by method score.

use reviewcrew_common::{Criterion, RankingEntry, RankingMethod};

use crate::normalise::ScoreMatrix;
use crate::scorer::{aggregate_with_weights, WeightedScores};
use crate::topsis::closeness_with_weights;

/// Scores under a ranking method's own score definition: the weighted
/// aggregate for `weighted`, the closeness coefficient for `topsis`.
pub fn method_scores(
    matrix: &ScoreMatrix,
    criteria: &[Criterion],
    weights: &[f64],
    method: RankingMethod,
) -> WeightedScores {
    match method {
        RankingMethod::Weighted => aggregate_with_weights(matrix, criteria, weights),
        RankingMethod::Topsis => closeness_with_weights(matrix, criteria, weights),
    }
}

/// Sort descending by score and assign dense 1-based ranks.
/// The sort is stable, so ties keep cohort input order.
pub fn rank_by_score(scores: &WeightedScores, method: RankingMethod) -> Vec<RankingEntry> {
    let mut ordered: Vec<_> = scores.iter().collect();
    ordered.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, s)| RankingEntry {
            product_id: s.product_id.clone(),
            rank: i + 1,
            score: s.score,
            method,
        })
        .collect()
}
