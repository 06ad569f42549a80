//! Axum route handlers for the Review API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::reviews::models::{NewReview, ReviewRow, StoredAnalysis, FREE_ANALYSIS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub user_id: Uuid,
    pub free_reviews_used: i32,
    pub free_review_limit: i32,
    pub remaining: i32,
}

/// The parts of a multipart upload the review flow needs.
struct UploadForm {
    user_id: Uuid,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reviews
///
/// Multipart form with `user_id` and `file`. Checks the free-review quota, extracts text,
/// analyzes it and stores the review. When analysis or storing the result fails, a review
/// with status `error` is stored instead and the failure is returned.
pub async fn handle_create_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ReviewRow>), AppError> {
    let form = read_upload(multipart).await?;

    if form.data.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "File size must be less than {}",
            format_size(state.config.max_upload_bytes)
        )));
    }

    let limit = state.config.free_review_limit;
    let usage = state.store.ensure_usage(form.user_id).await?;
    if usage.free_reviews_used >= limit {
        info!("User {} reached the free review limit ({limit})", form.user_id);
        return Err(AppError::QuotaExceeded);
    }

    let text = extract_off_runtime(&form).await?;

    let new_review = |analysis| NewReview {
        user_id: form.user_id,
        file_name: form.file_name.clone(),
        analysis_type: FREE_ANALYSIS.to_string(),
        analysis,
    };

    let outcome = match state.analyzer.analyze_resume(&text).await {
        Ok(summary) => {
            state
                .store
                .record_review(new_review(StoredAnalysis::completed(summary)), limit)
                .await
        }
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        // Another upload took the last free slot while this one was being analyzed.
        Err(AppError::QuotaExceeded) => {
            info!("User {} reached the free review limit ({limit})", form.user_id);
            Err(AppError::QuotaExceeded)
        }
        Err(e) => {
            warn!("Review of {} failed: {e}", form.file_name);
            if let Err(record_err) = state
                .store
                .record_review(new_review(StoredAnalysis::failed()), limit)
                .await
            {
                warn!("Could not store error review for {}: {record_err}", form.file_name);
            }
            Err(e)
        }
    }
}

/// GET /api/v1/reviews?user_id=
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ReviewRow>>, AppError> {
    Ok(Json(state.store.list_reviews(params.user_id).await?))
}

/// GET /api/v1/reviews/:id?user_id=
pub async fn handle_get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ReviewRow>, AppError> {
    state
        .store
        .get_review(params.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Review {id} not found")))
}

/// DELETE /api/v1/reviews/:id?user_id=
pub async fn handle_delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_review(params.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Review {id} not found")))
    }
}

/// GET /api/v1/usage?user_id=
pub async fn handle_get_usage(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UsageResponse>, AppError> {
    let usage = state.store.ensure_usage(params.user_id).await?;
    let limit = state.config.free_review_limit;
    Ok(Json(UsageResponse {
        user_id: usage.user_id,
        free_reviews_used: usage.free_reviews_used,
        free_review_limit: limit,
        remaining: (limit - usage.free_reviews_used).max(0),
    }))
}

/// Runs text extraction on the blocking pool; PDF parsing is CPU-bound.
async fn extract_off_runtime(form: &UploadForm) -> Result<String, AppError> {
    let file_name = form.file_name.clone();
    let content_type = form.content_type.clone();
    let data = form.data.clone();

    tokio::task::spawn_blocking(move || extract_text(&file_name, content_type.as_deref(), &data))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in text extraction: {e}"))
        })?
        .map_err(AppError::from)
}

fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut user_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("user_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable user_id: {e}")))?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                user_id = Some(parsed);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Please select a file".to_string()))?;

    Ok(UploadForm {
        user_id,
        file_name,
        content_type,
        data,
    })
}
