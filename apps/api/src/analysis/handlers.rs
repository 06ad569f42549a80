//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::analysis::{text_from_json, AnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analysis
///
/// Body `{ "text": "<résumé text>" }`. Runs the engine without storing anything.
/// A missing, empty or non-string `text` is rejected as invalid input.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalysisResult>, AppError> {
    let text = text_from_json(body.get("text").unwrap_or(&Value::Null))?;
    let result = state.analyzer.analyze_resume(text).await?;
    Ok(Json(result))
}
