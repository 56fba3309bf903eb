//! Invocation entry points for the task layer.
//!
//! Both functions are synchronous and side-effect free apart from logging,
//! so a failed run can be retried by simply calling again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info};
use uuid::Uuid;

use reviewcrew_common::entities::{validate_criteria, validate_products};
use reviewcrew_common::{
    CriteriaCatalog, Criterion, ProductScoreRecord, RankingEntry, RankingMethod, Result,
    ScoringConfig, TaskStatus,
};

use crate::normalise::{normalize_scores, ScoreMatrix};
use crate::planner::build_criteria;
use crate::ranking::rank_by_score;
use crate::scorer::{compute_weighted_scores, WeightedScores};
use crate::sensitivity::{analyze_sensitivity, magnitude_label, SensitivityReport};
use crate::topsis::compute_closeness;

// ── Criteria planning ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub review_id: Uuid,
    pub criteria: Vec<Criterion>,
    pub status: TaskStatus,
}

/// Plan evaluation criteria for a (category, audience) pair.
pub fn plan_criteria(
    catalog: &CriteriaCatalog,
    review_id: Uuid,
    category: &str,
    audience: &str,
) -> Result<PlanOutcome> {
    info!(%review_id, category, audience, "Starting criteria planning");

    match build_criteria(catalog, category, audience) {
        Ok(criteria) => {
            info!(%review_id, criteria_count = criteria.len(), "Criteria planning completed");
            Ok(PlanOutcome { review_id, criteria, status: TaskStatus::Completed })
        }
        Err(e) => {
            error!(%review_id, error = %e, "Criteria planning failed");
            Err(e)
        }
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringRequest {
    pub review_id: Uuid,
    pub products: Vec<ProductScoreRecord>,
    pub criteria: Vec<Criterion>,
    /// Falls back to `ScoringConfig::default_method`.
    #[serde(default)]
    pub method: Option<RankingMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringOutcome {
    pub review_id: Uuid,
    pub method: RankingMethod,
    pub normalized_scores: ScoreMatrix,
    pub weighted_scores: WeightedScores,
    pub rankings: Vec<RankingEntry>,
    pub sensitivity: SensitivityReport,
    /// magnitude label → products whose worst rank shift exceeds
    /// `ScoringConfig::robustness_threshold`
    pub fragile_products: BTreeMap<String, Vec<String>>,
    pub status: TaskStatus,
}

/// Normalise, aggregate, rank, and stress-test one review's cohort.
/// Returns either the complete outcome or an error; never a partial ranking.
pub fn compute_scores(request: &ScoringRequest, config: &ScoringConfig) -> Result<ScoringOutcome> {
    let review_id = request.review_id;
    let method = request.method.unwrap_or(config.default_method);
    info!(
        %review_id,
        %method,
        products = request.products.len(),
        criteria_count = request.criteria.len(),
        "Starting score computation"
    );

    match score_cohort(request, method, config) {
        Ok(outcome) => {
            info!(%review_id, "Score computation completed");
            Ok(outcome)
        }
        Err(e) => {
            error!(%review_id, error = %e, "Score computation failed");
            Err(e)
        }
    }
}

fn score_cohort(
    request: &ScoringRequest,
    method: RankingMethod,
    config: &ScoringConfig,
) -> Result<ScoringOutcome> {
    validate_criteria(&request.criteria)?;
    validate_products(&request.products)?;

    let matrix = normalize_scores(&request.products, &request.criteria);
    let weighted = compute_weighted_scores(&matrix, &request.criteria);

    let rankings = match method {
        RankingMethod::Weighted => rank_by_score(&weighted, method),
        RankingMethod::Topsis => rank_by_score(&compute_closeness(&matrix, &request.criteria), method),
    };
    debug!(review_id = %request.review_id, top = ?rankings.first().map(|r| &r.product_id), "Ranking computed");

    let sensitivity =
        analyze_sensitivity(&matrix, &request.criteria, method, &config.perturbations)?;
    let fragile_products: BTreeMap<String, Vec<String>> = config
        .perturbations
        .iter()
        .map(|&delta| {
            let fragile: Vec<String> = sensitivity
                .fragile_products(delta, config.robustness_threshold)
                .into_iter()
                .map(str::to_string)
                .collect();
            (magnitude_label(delta), fragile)
        })
        .collect();

    Ok(ScoringOutcome {
        review_id: request.review_id,
        method,
        normalized_scores: matrix,
        weighted_scores: weighted,
        rankings,
        sensitivity,
        fragile_products,
        status: TaskStatus::Completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewcrew_common::{Direction, Normalization, ReviewError};

    fn request(criteria: Vec<Criterion>, products: Vec<ProductScoreRecord>) -> ScoringRequest {
        ScoringRequest { review_id: Uuid::nil(), products, criteria, method: None }
    }

    #[test]
    fn test_plan_criteria_completes() {
        let outcome = plan_criteria(&CriteriaCatalog::default(), Uuid::nil(), "ai_video", "startups").unwrap();
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(outcome.criteria.len(), 5);
    }

    #[test]
    fn test_default_method_comes_from_config() {
        let criteria = vec![Criterion::new("c1", Direction::HigherBetter, Normalization::Minmax, 1.0)];
        let products = vec![ProductScoreRecord::new("p1").with_score("c1", 1.0)];
        let config = ScoringConfig { default_method: RankingMethod::Topsis, ..Default::default() };
        let outcome = compute_scores(&request(criteria, products), &config).unwrap();
        assert_eq!(outcome.method, RankingMethod::Topsis);
        assert_eq!(outcome.rankings[0].method, RankingMethod::Topsis);
    }

    #[test]
    fn test_invalid_weight_returns_no_outcome() {
        let criteria = vec![Criterion::new("c1", Direction::HigherBetter, Normalization::Minmax, f64::INFINITY)];
        let products = vec![ProductScoreRecord::new("p1").with_score("c1", 1.0)];
        let err = compute_scores(&request(criteria, products), &ScoringConfig::default()).unwrap_err();
        assert!(matches!(err, ReviewError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_request_rejects_unknown_method_string() {
        let json = r#"{"review_id":"00000000-0000-0000-0000-000000000000","products":[],"criteria":[],"method":"electre"}"#;
        assert!(serde_json::from_str::<ScoringRequest>(json).is_err());
    }

    #[test]
    fn test_fragile_products_follow_threshold() {
        // near tie: a 0.51, b 0.49; a -50% swing on c1 swaps them
        let criteria = vec![
            Criterion::new("c1", Direction::HigherBetter, Normalization::None, 0.55),
            Criterion::new("c2", Direction::HigherBetter, Normalization::None, 0.45),
        ];
        let products = vec![
            ProductScoreRecord::new("a").with_score("c1", 0.6).with_score("c2", 0.4),
            ProductScoreRecord::new("b").with_score("c1", 0.4).with_score("c2", 0.6),
        ];
        let strict = ScoringConfig { perturbations: vec![0.5], ..Default::default() };
        let outcome = compute_scores(&request(criteria.clone(), products.clone()), &strict).unwrap();
        assert_eq!(outcome.fragile_products["delta_50"], vec!["a".to_string(), "b".to_string()]);

        let lenient = ScoringConfig { robustness_threshold: 1, ..strict };
        let outcome = compute_scores(&request(criteria, products), &lenient).unwrap();
        assert!(outcome.fragile_products["delta_50"].is_empty());
    }

    #[test]
    fn test_empty_cohort_scores_cleanly() {
        let criteria = vec![Criterion::new("c1", Direction::HigherBetter, Normalization::Zscore, 1.0)];
        let outcome = compute_scores(&request(criteria, vec![]), &ScoringConfig::default()).unwrap();
        assert!(outcome.rankings.is_empty());
        assert!(outcome.sensitivity.products.is_empty());
    }
}
