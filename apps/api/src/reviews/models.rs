use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::AnalysisResult;

pub const FREE_ANALYSIS: &str = "free";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Completed,
    Error,
}

/// The `analysis_result` JSON column: status plus the summary when analysis succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AnalysisResult>,
}

impl StoredAnalysis {
    pub fn completed(summary: AnalysisResult) -> Self {
        Self {
            status: ReviewStatus::Completed,
            summary: Some(summary),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ReviewStatus::Error,
            summary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub analysis_type: String,
    pub analysis_result: Json<StoredAnalysis>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewUsageRow {
    pub user_id: Uuid,
    pub free_reviews_used: i32,
    pub updated_at: DateTime<Utc>,
}

/// A review about to be stored.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub file_name: String,
    pub analysis_type: String,
    pub analysis: StoredAnalysis,
}

impl NewReview {
    /// Completed free reviews count against the user's quota.
    pub fn consumes_free_review(&self) -> bool {
        self.analysis.status == ReviewStatus::Completed && self.analysis_type == FREE_ANALYSIS
    }
}
