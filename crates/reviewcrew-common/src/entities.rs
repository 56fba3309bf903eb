//! Typed records exchanged between the criteria planner, the scoring core,
//! and the task layer that persists their output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReviewError, Result};

// ---------------------------------------------------------------------------
// Criterion
// ---------------------------------------------------------------------------

/// Whether higher or lower raw values are preferable for a criterion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl FromStr for Direction {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "higher_better" => Ok(Direction::HigherBetter),
            "lower_better" => Ok(Direction::LowerBetter),
            other => Err(ReviewError::Config(format!(
                "unknown criterion direction '{other}' (expected higher_better | lower_better)"
            ))),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ReviewError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Cohort-relative normalisation applied to one criterion column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Normalization {
    Minmax,
    Zscore,
    None,
}

impl FromStr for Normalization {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "minmax" => Ok(Normalization::Minmax),
            "zscore" => Ok(Normalization::Zscore),
            "none" => Ok(Normalization::None),
            other => Err(ReviewError::Config(format!(
                "unknown normalization '{other}' (expected minmax | zscore | none)"
            ))),
        }
    }
}

impl TryFrom<String> for Normalization {
    type Error = ReviewError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A named, weighted axis of comparison between products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Criterion {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub direction: Direction,
    pub normalization: Normalization,
    /// Non-negative; re-normalised against the whole set before use.
    pub weight: f64,
}

impl Criterion {
    pub fn new(
        id: impl Into<String>,
        direction: Direction,
        normalization: Normalization,
        weight: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            direction,
            normalization,
            weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ReviewError::Config("criterion id must not be empty".into()));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ReviewError::Config(format!(
                "criterion '{}' has invalid weight {} (must be finite and >= 0)",
                self.id, self.weight
            )));
        }
        Ok(())
    }
}

/// Validate a whole criterion set: every entry valid, ids unique.
pub fn validate_criteria(criteria: &[Criterion]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for c in criteria {
        c.validate()?;
        if !seen.insert(c.id.as_str()) {
            return Err(ReviewError::Config(format!("duplicate criterion id '{}'", c.id)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Product scores
// ---------------------------------------------------------------------------

/// Raw per-criterion scores for one product in the cohort.
/// A missing criterion entry counts as a raw score of 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProductScoreRecord {
    #[serde(alias = "id")]
    pub product_id: String,
    #[serde(default, alias = "scores")]
    pub raw_scores: BTreeMap<String, f64>,
}

impl ProductScoreRecord {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self { product_id: product_id.into(), raw_scores: BTreeMap::new() }
    }

    pub fn with_score(mut self, criterion_id: impl Into<String>, raw: f64) -> Self {
        self.raw_scores.insert(criterion_id.into(), raw);
        self
    }

    pub fn raw(&self, criterion_id: &str) -> f64 {
        self.raw_scores.get(criterion_id).copied().unwrap_or(0.0)
    }
}

/// Validate a cohort: product ids unique and non-empty, raw scores finite.
pub fn validate_products(products: &[ProductScoreRecord]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for p in products {
        if p.product_id.trim().is_empty() {
            return Err(ReviewError::InvalidInput("product id must not be empty".into()));
        }
        if !seen.insert(p.product_id.as_str()) {
            return Err(ReviewError::InvalidInput(format!(
                "duplicate product id '{}'",
                p.product_id
            )));
        }
        if let Some((cid, raw)) = p.raw_scores.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ReviewError::InvalidInput(format!(
                "product '{}' has non-finite raw score {raw} for criterion '{cid}'",
                p.product_id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Deserialised through `FromStr`, so config files and task payloads accept
/// the same spellings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum RankingMethod {
    #[default]
    Weighted,
    Topsis,
}

impl FromStr for RankingMethod {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "weighted" | "weighted_sum" => Ok(RankingMethod::Weighted),
            "topsis" => Ok(RankingMethod::Topsis),
            other => Err(ReviewError::Config(format!(
                "unknown ranking method '{other}' (expected weighted | topsis)"
            ))),
        }
    }
}

impl TryFrom<String> for RankingMethod {
    type Error = ReviewError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingMethod::Weighted => write!(f, "weighted"),
            RankingMethod::Topsis => write!(f, "topsis"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub product_id: String,
    /// 1-based, 1 = best.
    pub rank: usize,
    pub score: f64,
    pub method: RankingMethod,
}

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_normalization_rejected() {
        let err = "log".parse::<Normalization>().unwrap_err();
        assert!(matches!(err, ReviewError::Config(_)));
        assert!(err.to_string().contains("log"));
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("MinMax".parse::<Normalization>().unwrap(), Normalization::Minmax);
        assert_eq!("Lower_Better".parse::<Direction>().unwrap(), Direction::LowerBetter);
        assert_eq!("weighted_sum".parse::<RankingMethod>().unwrap(), RankingMethod::Weighted);
        assert_eq!("TOPSIS".parse::<RankingMethod>().unwrap(), RankingMethod::Topsis);
        assert!("electre".parse::<RankingMethod>().is_err());
    }

    #[test]
    fn test_json_enum_spellings_match_from_str() {
        let json = r#"{"id":"c1","direction":"Lower_Better","normalization":"ZScore","weight":0.5}"#;
        let c: Criterion = serde_json::from_str(json).unwrap();
        assert_eq!(c.direction, Direction::LowerBetter);
        assert_eq!(c.normalization, Normalization::Zscore);

        let method: RankingMethod = serde_json::from_str(r#""TOPSIS""#).unwrap();
        assert_eq!(method, RankingMethod::Topsis);
        let method: RankingMethod = serde_json::from_str(r#""weighted_sum""#).unwrap();
        assert_eq!(method, RankingMethod::Weighted);
        assert_eq!(serde_json::to_string(&RankingMethod::Weighted).unwrap(), r#""weighted""#);
    }

    #[test]
    fn test_criterion_json_rejects_unknown_direction() {
        let json = r#"{"id":"c1","direction":"sideways","normalization":"minmax","weight":0.5}"#;
        assert!(serde_json::from_str::<Criterion>(json).is_err());
    }

    #[test]
    fn test_criterion_json_rejects_missing_weight() {
        let json = r#"{"id":"c1","direction":"higher_better","normalization":"minmax"}"#;
        assert!(serde_json::from_str::<Criterion>(json).is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let c = Criterion::new("c1", Direction::HigherBetter, Normalization::Minmax, -0.1);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_duplicate_criterion_ids_rejected() {
        let c = Criterion::new("c1", Direction::HigherBetter, Normalization::Minmax, 0.5);
        assert!(validate_criteria(&[c.clone(), c]).is_err());
    }

    #[test]
    fn test_product_record_accepts_legacy_field_names() {
        let json = r#"{"id":"p1","scores":{"c1":50.0}}"#;
        let p: ProductScoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(p.product_id, "p1");
        assert_eq!(p.raw("c1"), 50.0);
        assert_eq!(p.raw("c2"), 0.0);
    }

    #[test]
    fn test_non_finite_raw_score_rejected() {
        let p = ProductScoreRecord::new("p1").with_score("c1", f64::NAN);
        assert!(matches!(validate_products(&[p]), Err(ReviewError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_product_ids_rejected() {
        let p = ProductScoreRecord::new("p1");
        assert!(validate_products(&[p.clone(), p]).is_err());
    }
}
