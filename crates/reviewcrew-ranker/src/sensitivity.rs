//! Rank stability under criterion weight perturbation.
//!
//! For each magnitude δ and each criterion, the criterion's weight is scaled
//! by (1 + δ) and by (1 − δ), weights are renormalised, and the cohort is
//! re-scored and re-ranked with the same method. Each product's report cell
//! holds the worst rank and score shift seen across all of those runs.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub use reviewcrew_common::scoring_config::magnitude_label;
use reviewcrew_common::scoring_config::validate_perturbations;
use reviewcrew_common::{Criterion, RankingEntry, RankingMethod, Result};

use crate::normalise::ScoreMatrix;
use crate::ranking::{method_scores, rank_by_score};
use crate::weights::{effective_weights, perturbed};

/// Worst-case effect of single-criterion perturbations of one magnitude.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerturbationImpact {
    pub magnitude: f64,
    pub max_rank_shift: usize,
    pub max_score_shift: f64,
}

/// Ranking obtained after scaling one criterion's weight by (1 + variation).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CriterionStability {
    pub criterion_id: String,
    pub variation: f64,
    /// 1 / (1 + mean absolute rank change); 1.0 means no product moved.
    pub stability_index: f64,
    pub rankings: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SensitivityReport {
    /// product id → magnitude label (`delta_10`, …) → worst-case impact
    pub products: BTreeMap<String, BTreeMap<String, PerturbationImpact>>,
    pub criteria: Vec<CriterionStability>,
}

impl SensitivityReport {
    pub fn impact(&self, product_id: &str, magnitude: f64) -> Option<&PerturbationImpact> {
        self.products.get(product_id)?.get(&magnitude_label(magnitude))
    }

    /// Products whose worst rank shift at `magnitude` exceeds `threshold`.
    pub fn fragile_products(&self, magnitude: f64, threshold: usize) -> Vec<&str> {
        let label = magnitude_label(magnitude);
        self.products
            .iter()
            .filter(|(_, cells)| cells.get(&label).is_some_and(|i| i.max_rank_shift > threshold))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

pub fn analyze_sensitivity(
    matrix: &ScoreMatrix,
    criteria: &[Criterion],
    method: RankingMethod,
    perturbations: &[f64],
) -> Result<SensitivityReport> {
    validate_perturbations(perturbations)?;

    let base_weights = effective_weights(criteria);
    let baseline = rank_by_score(&method_scores(matrix, criteria, &base_weights, method), method);
    let baseline_by_id: HashMap<&str, &RankingEntry> =
        baseline.iter().map(|e| (e.product_id.as_str(), e)).collect();

    let mut report = SensitivityReport::default();
    for row in matrix.rows() {
        let cells = report.products.entry(row.product_id.clone()).or_default();
        for &delta in perturbations {
            cells.insert(
                magnitude_label(delta),
                PerturbationImpact { magnitude: delta, max_rank_shift: 0, max_score_shift: 0.0 },
            );
        }
    }

    for &delta in perturbations {
        let label = magnitude_label(delta);
        for (index, criterion) in criteria.iter().enumerate() {
            for variation in [delta, -delta] {
                let weights = perturbed(&base_weights, index, 1.0 + variation);
                let rankings = rank_by_score(&method_scores(matrix, criteria, &weights, method), method);

                let mut total_shift = 0usize;
                for entry in &rankings {
                    let Some(base) = baseline_by_id.get(entry.product_id.as_str()) else {
                        continue;
                    };
                    let rank_shift = entry.rank.abs_diff(base.rank);
                    let score_shift = (entry.score - base.score).abs();
                    total_shift += rank_shift;

                    if let Some(cell) = report
                        .products
                        .get_mut(&entry.product_id)
                        .and_then(|cells| cells.get_mut(&label))
                    {
                        cell.max_rank_shift = cell.max_rank_shift.max(rank_shift);
                        cell.max_score_shift = cell.max_score_shift.max(score_shift);
                    }
                }

                let mean_shift = if rankings.is_empty() {
                    0.0
                } else {
                    total_shift as f64 / rankings.len() as f64
                };
                report.criteria.push(CriterionStability {
                    criterion_id: criterion.id.clone(),
                    variation,
                    stability_index: 1.0 / (1.0 + mean_shift),
                    rankings,
                });
            }
        }
    }

    Ok(report)
}
