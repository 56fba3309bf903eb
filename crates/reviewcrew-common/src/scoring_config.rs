//! Scoring run configuration.
//!
//! Loaded once by the task layer and passed explicitly into every scoring
//! run; nothing here is read from global state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::RankingMethod;
use crate::error::{ReviewError, Result};

// ── Scoring Configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Ranking method used when a task does not name one
    #[serde(default)]
    pub default_method: RankingMethod,

    /// Weight perturbation magnitudes for sensitivity analysis (0.10 = ±10%)
    #[serde(default = "default_perturbations")]
    pub perturbations: Vec<f64>,

    /// Largest worst-case rank shift at which a product still counts as robust
    #[serde(default)]
    pub robustness_threshold: usize,

    /// Retry policy for the task layer
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_perturbations() -> Vec<f64> { vec![0.10, 0.20, 0.50] }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_method: RankingMethod::default(),
            perturbations: default_perturbations(),
            robustness_threshold: 0,
            retry: RetryConfig::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        validate_perturbations(&self.perturbations)?;
        self.retry.validate()
    }
}

/// Whole-percent report key for a magnitude: `0.10` → `delta_10`.
pub fn magnitude_label(magnitude: f64) -> String {
    format!("delta_{}", (magnitude * 100.0).round() as i64)
}

/// Magnitudes must be finite, at least half a percent, and map to
/// distinct labels.
pub fn validate_perturbations(perturbations: &[f64]) -> Result<()> {
    let mut labels = HashMap::new();
    for &d in perturbations {
        if !d.is_finite() || d <= 0.0 {
            return Err(ReviewError::Config(format!(
                "perturbation magnitude {d} is invalid (must be finite and > 0)"
            )));
        }
        let label = magnitude_label(d);
        if label == "delta_0" {
            return Err(ReviewError::Config(format!(
                "perturbation magnitude {d} rounds to 0%"
            )));
        }
        if let Some(prev) = labels.insert(label.clone(), d) {
            return Err(ReviewError::Config(format!(
                "perturbation magnitudes {prev} and {d} share the label '{label}'"
            )));
        }
    }
    Ok(())
}

// ── Retry Configuration ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> usize { 3 }
fn default_initial_interval_ms() -> u64 { 100 }
fn default_max_interval_ms() -> u64 { 10_000 }
fn default_multiplier() -> f64 { 2.0 }

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ReviewError::Config(format!(
                "retry multiplier {} must be >= 1.0",
                self.multiplier
            )));
        }
        if self.initial_interval_ms > self.max_interval_ms {
            return Err(ReviewError::Config(format!(
                "retry initial interval {}ms exceeds max interval {}ms",
                self.initial_interval_ms, self.max_interval_ms
            )));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.default_method, RankingMethod::Weighted);
        assert_eq!(config.perturbations, vec![0.10, 0.20, 0.50]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "default_method: topsis\nretry:\n  max_retries: 5\n";
        let config: ScoringConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_method, RankingMethod::Topsis);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_interval_ms, 100);
        assert_eq!(config.perturbations.len(), 3);
    }

    #[test]
    fn test_toml_section_parses() {
        let toml_src = "perturbations = [0.05, 0.25]\nrobustness_threshold = 1\n";
        let config: ScoringConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.perturbations, vec![0.05, 0.25]);
        assert_eq!(config.robustness_threshold, 1);
    }

    #[test]
    fn test_invalid_perturbation_rejected() {
        let config = ScoringConfig { perturbations: vec![0.1, -0.2], ..Default::default() };
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));
    }

    #[test]
    fn test_colliding_magnitudes_rejected() {
        let err = validate_perturbations(&[0.5, 0.501]).unwrap_err();
        assert!(err.to_string().contains("delta_50"));
        assert!(validate_perturbations(&[0.1, 0.1]).is_err());
        assert!(matches!(validate_perturbations(&[0.001]), Err(ReviewError::Config(_))));
        assert!(validate_perturbations(&[0.05, 0.1, 0.125]).is_ok());
    }

    #[test]
    fn test_retry_interval_ordering_checked() {
        let retry = RetryConfig { initial_interval_ms: 500, max_interval_ms: 100, ..Default::default() };
        assert!(retry.validate().is_err());
    }
}
