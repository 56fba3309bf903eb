//! Criterion template tables.
//!
//! Category templates and audience weight overrides are plain configuration
//! data: built in by default, optionally replaced from a YAML/JSON file at
//! startup, and never mutated after that.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{Criterion, Direction, Normalization};
use crate::error::{ReviewError, Result};

/// One row of a category template, before audience overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CriterionTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub direction: Direction,
    pub normalization: Normalization,
    pub weight: f64,
}

impl CriterionTemplate {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        direction: Direction,
        weight: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            direction,
            normalization: Normalization::Minmax,
            weight,
        }
    }

    pub fn to_criterion(&self) -> Criterion {
        Criterion {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            direction: self.direction,
            normalization: self.normalization,
            weight: self.weight,
        }
    }
}

/// Category → criteria templates plus audience → weight overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CriteriaCatalog {
    /// Used when no category template matches.
    pub generic: Vec<CriterionTemplate>,

    /// Keyed by lowercase category.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<CriterionTemplate>>,

    /// Keyed by lowercase audience, then by criterion display name.
    /// Values replace the template weight; they are not deltas.
    #[serde(default)]
    pub audiences: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for CriteriaCatalog {
    fn default() -> Self {
        use Direction::{HigherBetter as Hi, LowerBetter as Lo};
        let t = CriterionTemplate::new;

        let mut categories = BTreeMap::new();
        categories.insert(
            "ai_video".to_string(),
            vec![
                t("video_quality", "Video Quality", "Output video resolution and visual quality", Hi, 0.25),
                t("generation_speed", "Generation Speed", "Time to generate video content", Lo, 0.20),
                t("ai_model_quality", "AI Model Quality", "Sophistication of underlying AI models", Hi, 0.20),
                t("ease_of_use", "Ease of Use", "User interface and workflow simplicity", Hi, 0.15),
                t("price_per_video", "Price per Video", "Cost per generated video", Lo, 0.20),
            ],
        );
        categories.insert(
            "ai_writing".to_string(),
            vec![
                t("content_quality", "Content Quality", "Writing quality and coherence", Hi, 0.30),
                t("customization", "Customization", "Ability to customize tone and style", Hi, 0.20),
                t("speed", "Speed", "Time to generate content", Lo, 0.15),
                t("plagiarism_check", "Plagiarism Check", "Built-in plagiarism detection", Hi, 0.15),
                t("price_per_word", "Price per Word", "Cost per generated word", Lo, 0.20),
            ],
        );
        categories.insert(
            "project_management".to_string(),
            vec![
                t("feature_completeness", "Feature Completeness", "Comprehensive project management features", Hi, 0.25),
                t("team_collaboration", "Team Collaboration", "Multi-user collaboration capabilities", Hi, 0.20),
                t("integration_options", "Integration Options", "Third-party integrations available", Hi, 0.15),
                t("learning_curve", "Learning Curve", "Ease of getting started", Hi, 0.15),
                t("price_per_user", "Price per User", "Monthly cost per team member", Lo, 0.25),
            ],
        );

        let generic = vec![
            t("quality", "Quality", "Overall product quality", Hi, 0.30),
            t("price", "Price", "Product pricing", Lo, 0.30),
            t("ease_of_use", "Ease of Use", "User experience and simplicity", Hi, 0.20),
            t("features", "Features", "Feature completeness", Hi, 0.20),
        ];

        let mut audiences = BTreeMap::new();
        audiences.insert(
            "freelancers".to_string(),
            BTreeMap::from([("Price".to_string(), 0.40), ("Ease of Use".to_string(), 0.25)]),
        );
        audiences.insert(
            "enterprise".to_string(),
            BTreeMap::from([
                ("Quality".to_string(), 0.40),
                ("Features".to_string(), 0.30),
                ("Price".to_string(), 0.20),
            ]),
        );
        audiences.insert(
            "startups".to_string(),
            BTreeMap::from([
                ("Price".to_string(), 0.35),
                ("Features".to_string(), 0.25),
                ("Ease of Use".to_string(), 0.25),
            ]),
        );

        Self { generic, categories, audiences }
    }
}

impl CriteriaCatalog {
    /// Load from YAML file
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_yaml::from_str(&content)?;
        catalog.normalised_keys().validated()
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)?;
        catalog.normalised_keys().validated()
    }

    /// Template for a category (case-insensitive), falling back to the generic one.
    pub fn template_for(&self, category: &str) -> &[CriterionTemplate] {
        self.categories
            .get(&category.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(self.generic.as_slice())
    }

    pub fn overrides_for(&self, audience: &str) -> Option<&BTreeMap<String, f64>> {
        self.audiences.get(&audience.trim().to_lowercase())
    }

    fn normalised_keys(self) -> Self {
        let lower = |k: String| k.trim().to_lowercase();
        Self {
            generic: self.generic,
            categories: self.categories.into_iter().map(|(k, v)| (lower(k), v)).collect(),
            audiences: self.audiences.into_iter().map(|(k, v)| (lower(k), v)).collect(),
        }
    }

    /// Every template must be able to produce a usable, re-normalisable
    /// criterion list, whatever audience is applied to it.
    pub fn validated(self) -> Result<Self> {
        if self.generic.is_empty() {
            return Err(ReviewError::Config("generic criteria template must not be empty".into()));
        }
        validate_template("generic", &self.generic)?;
        for (category, template) in &self.categories {
            if template.is_empty() {
                return Err(ReviewError::Config(format!(
                    "criteria template for category '{category}' is empty"
                )));
            }
            validate_template(category, template)?;
        }
        for (audience, overrides) in &self.audiences {
            if let Some((name, w)) = overrides.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
                return Err(ReviewError::Config(format!(
                    "audience '{audience}' overrides '{name}' with invalid weight {w}"
                )));
            }
        }
        Ok(self)
    }
}

fn validate_template(label: &str, template: &[CriterionTemplate]) -> Result<()> {
    let mut ids = std::collections::HashSet::new();
    let mut sum = 0.0;
    for row in template {
        row.to_criterion().validate()?;
        if !ids.insert(row.id.as_str()) {
            return Err(ReviewError::Config(format!(
                "template '{label}' repeats criterion id '{}'",
                row.id
            )));
        }
        sum += row.weight;
    }
    if sum <= 0.0 {
        return Err(ReviewError::Config(format!("template '{label}' has zero total weight")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert!(CriteriaCatalog::default().validated().is_ok());
    }

    #[test]
    fn test_unknown_category_falls_back_to_generic() {
        let catalog = CriteriaCatalog::default();
        let names: Vec<&str> = catalog.template_for("kitchen_gadgets").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Quality", "Price", "Ease of Use", "Features"]);
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let catalog = CriteriaCatalog::default();
        assert_eq!(catalog.template_for("AI_Video")[0].id, "video_quality");
        assert!(catalog.overrides_for("Enterprise").is_some());
        assert!(catalog.overrides_for("students").is_none());
    }

    #[test]
    fn test_yaml_catalog_keys_are_lowercased() {
        let yaml = r#"
generic:
  - { id: quality, name: Quality, direction: higher_better, normalization: minmax, weight: 1.0 }
categories:
  Headphones:
    - { id: sound, name: Sound, direction: higher_better, normalization: zscore, weight: 0.6 }
    - { id: price, name: Price, direction: lower_better, normalization: minmax, weight: 0.4 }
audiences:
  Audiophiles: { Sound: 0.9 }
"#;
        let catalog: CriteriaCatalog = serde_yaml::from_str(yaml).unwrap();
        let catalog = catalog.normalised_keys().validated().unwrap();
        assert_eq!(catalog.template_for("headphones").len(), 2);
        assert_eq!(catalog.overrides_for("audiophiles").unwrap()["Sound"], 0.9);
    }

    #[test]
    fn test_zero_weight_template_rejected() {
        let mut catalog = CriteriaCatalog::default();
        for row in &mut catalog.generic {
            row.weight = 0.0;
        }
        assert!(matches!(catalog.validated(), Err(ReviewError::Config(_))));
    }
}
