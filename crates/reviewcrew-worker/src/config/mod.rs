//! Configuration loading for the reviewcrew worker.
//! Reads reviewcrew.toml from the current directory or the path in REVIEWCREW_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use reviewcrew_common::{CriteriaCatalog, ReviewError, ScoringConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// YAML or JSON criteria catalog replacing the built-in tables
    pub catalog_path: Option<String>,
}

impl Config {
    pub fn load() -> reviewcrew_common::Result<Self> {
        let path = std::env::var("REVIEWCREW_CONFIG")
            .unwrap_or_else(|_| "reviewcrew.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// A missing file means built-in defaults. A file that exists but does
    /// not parse or validate is an error.
    pub fn load_from(path: &Path) -> reviewcrew_common::Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found; using built-in defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> reviewcrew_common::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Criteria catalog to plan with; loaded once at startup.
    pub fn catalog(&self) -> reviewcrew_common::Result<CriteriaCatalog> {
        let Some(path) = self.catalog_path.as_deref() else {
            return Ok(CriteriaCatalog::default());
        };
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => CriteriaCatalog::from_yaml(path),
            Some("json") => CriteriaCatalog::from_json(path),
            _ => Err(ReviewError::Config(format!(
                "catalog file '{path}' must end in .yaml, .yml or .json"
            ))),
        }
    }
}
