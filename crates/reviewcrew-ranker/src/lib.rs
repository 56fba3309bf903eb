//! reviewcrew-ranker — Multi-criteria scoring and ranking engine.
//!
//! Pipeline: criteria planning → cohort normalisation → weighted
//! aggregation → ranking → sensitivity analysis. Every function is pure:
//! inputs are passed in, outputs are freshly allocated, nothing is cached.

pub mod planner;
pub mod weights;
pub mod normalise;
pub mod scorer;
pub mod topsis;
pub mod ranking;
pub mod sensitivity;
pub mod engine;

pub use engine::{compute_scores, plan_criteria, PlanOutcome, ScoringOutcome, ScoringRequest};
pub use normalise::{normalize_scores, ScoreMatrix};
pub use scorer::{compute_weighted_scores, WeightedScores};
pub use sensitivity::SensitivityReport;
