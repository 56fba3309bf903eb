//! Cohort-relative score normalisation.
//!
//! Every criterion column is normalised against the whole cohort of
//! products in the review, never per product.

use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;

use reviewcrew_common::{Criterion, Normalization, ProductScoreRecord};

/// Normalised scores for one product, keyed by criterion id.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub product_id: String,
    pub scores: BTreeMap<String, f64>,
}

/// Product → criterion → normalised value, in cohort input order.
/// Serialises as a JSON object keyed by product id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreMatrix {
    rows: Vec<MatrixRow>,
}

impl ScoreMatrix {
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn get(&self, product_id: &str, criterion_id: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.product_id == product_id)
            .and_then(|r| r.scores.get(criterion_id).copied())
    }
}

impl Serialize for ScoreMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.rows.iter().map(|r| (&r.product_id, &r.scores)))
    }
}

/// Min-max normalisation within the cohort range [min_val, max_val].
/// A tied cohort maps to the 0.5 midpoint.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    if max_val == min_val {
        return 0.5; // degenerate case
    }
    (value - min_val) / (max_val - min_val)
}

/// Z-score against the cohort's population mean/std, rescaled assuming a
/// ±3σ range and clamped so outliers saturate at 0 or 1.
pub fn zscore_normalise(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        return 0.5;
    }
    let z = (value - mean) / std;
    ((z + 3.0) / 6.0).clamp(0.0, 1.0)
}

/// Columns whose largest magnitude exceeds this are rescaled before
/// normalising, so the range and variance stay finite.
const RESCALE_ABOVE: f64 = 1e150;

/// Both normalisations are scale-invariant, so dividing by the peak
/// magnitude leaves the result unchanged.
fn rescaled(raw: &[f64]) -> Option<Vec<f64>> {
    let peak = raw.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    (peak > RESCALE_ABOVE).then(|| raw.iter().map(|v| v / peak).collect())
}

/// Normalise one criterion column (raw cohort values, input order).
pub fn normalise_column(raw: &[f64], method: Normalization) -> Vec<f64> {
    if raw.is_empty() {
        return vec![];
    }
    if method != Normalization::None {
        if let Some(scaled) = rescaled(raw) {
            return normalise_column(&scaled, method);
        }
    }
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match method {
        Normalization::Minmax => raw.iter().map(|&v| minmax_normalise(v, min, max)).collect(),
        // Tied on the raw values; a computed mean can drift off the value
        // and leave a tiny non-zero std.
        Normalization::Zscore if min == max => vec![0.5; raw.len()],
        Normalization::Zscore => {
            let n = raw.len() as f64;
            let mean = raw.iter().sum::<f64>() / n;
            // population variance (ddof = 0)
            let variance = raw.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            raw.iter().map(|&v| zscore_normalise(v, mean, std)).collect()
        }
        // Passed through; keeping it in [0, 1] is the caller's job.
        Normalization::None => raw.to_vec(),
    }
}

/// Build the normalised score matrix for a cohort.
/// Missing raw scores count as 0; scores for criteria not in `criteria`
/// are ignored.
pub fn normalize_scores(products: &[ProductScoreRecord], criteria: &[Criterion]) -> ScoreMatrix {
    let mut rows: Vec<MatrixRow> = products
        .iter()
        .map(|p| MatrixRow { product_id: p.product_id.clone(), scores: BTreeMap::new() })
        .collect();

    for criterion in criteria {
        let raw: Vec<f64> = products.iter().map(|p| p.raw(&criterion.id)).collect();
        let normed = normalise_column(&raw, criterion.normalization);
        for (row, value) in rows.iter_mut().zip(normed) {
            row.scores.insert(criterion.id.clone(), value);
        }
    }

    ScoreMatrix { rows }
}
