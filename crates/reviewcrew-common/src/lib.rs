//! reviewcrew-common — Shared records, errors, and configuration used across all reviewcrew crates.

pub mod error;
pub mod entities;
pub mod catalog;
pub mod scoring_config;

// Re-export commonly used types
pub use error::{ReviewError, Result};
pub use entities::{
    Criterion, Direction, Normalization, ProductScoreRecord, RankingEntry, RankingMethod,
    TaskStatus,
};
pub use catalog::{CriteriaCatalog, CriterionTemplate};
pub use scoring_config::{RetryConfig, ScoringConfig};
