//! Task envelopes accepted by the worker and their dispatch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reviewcrew_common::{CriteriaCatalog, Result, ScoringConfig, TaskStatus};
use reviewcrew_ranker::{compute_scores, plan_criteria, ScoringRequest};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskEnvelope {
    PlanCriteria {
        review_id: Uuid,
        category: String,
        audience: String,
    },
    ComputeScores(ScoringRequest),
}

/// Reported instead of a result; carries no partial output.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub review_id: Option<Uuid>,
    pub status: TaskStatus,
    pub error: String,
}

impl TaskFailure {
    pub fn new(review_id: Option<Uuid>, error: impl ToString) -> Self {
        Self { review_id, status: TaskStatus::Failed, error: error.to_string() }
    }
}

impl TaskEnvelope {
    pub fn name(&self) -> &'static str {
        match self {
            TaskEnvelope::PlanCriteria { .. } => "plan_criteria",
            TaskEnvelope::ComputeScores(_) => "compute_scores",
        }
    }

    pub fn review_id(&self) -> Uuid {
        match self {
            TaskEnvelope::PlanCriteria { review_id, .. } => *review_id,
            TaskEnvelope::ComputeScores(request) => request.review_id,
        }
    }

    /// Run the task once and serialise its outcome.
    pub fn run(&self, catalog: &CriteriaCatalog, config: &ScoringConfig) -> Result<serde_json::Value> {
        match self {
            TaskEnvelope::PlanCriteria { review_id, category, audience } => {
                let outcome = plan_criteria(catalog, *review_id, category, audience)?;
                Ok(serde_json::to_value(outcome)?)
            }
            TaskEnvelope::ComputeScores(request) => {
                let outcome = compute_scores(request, config)?;
                Ok(serde_json::to_value(outcome)?)
            }
        }
    }
}
