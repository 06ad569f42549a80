//! Review persistence behind a trait so handlers never depend on a concrete backend.
//!
//! `AppState` holds an `Arc<dyn ReviewStore>`; production uses `PgReviewStore`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::reviews::models::{NewReview, ReviewRow, ReviewUsageRow};

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Returns the user's usage row, creating it with zero reviews used if absent.
    async fn ensure_usage(&self, user_id: Uuid) -> Result<ReviewUsageRow, AppError>;

    /// Stores a review. A completed free review claims one of the user's `free_review_limit`
    /// slots in the same transaction; `AppError::QuotaExceeded` when none is left.
    async fn record_review(
        &self,
        review: NewReview,
        free_review_limit: i32,
    ) -> Result<ReviewRow, AppError>;

    /// Newest first.
    async fn list_reviews(&self, user_id: Uuid) -> Result<Vec<ReviewRow>, AppError>;

    async fn get_review(&self, user_id: Uuid, id: Uuid) -> Result<Option<ReviewRow>, AppError>;

    /// Returns false when no such review exists for the user.
    async fn delete_review(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn ensure_usage(&self, user_id: Uuid) -> Result<ReviewUsageRow, AppError> {
        let row = sqlx::query_as::<_, ReviewUsageRow>(
            r#"
            INSERT INTO review_usage (user_id, free_reviews_used)
            VALUES ($1, 0)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, free_reviews_used, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn record_review(
        &self,
        review: NewReview,
        free_review_limit: i32,
    ) -> Result<ReviewRow, AppError> {
        let mut tx = self.pool.begin().await?;

        if review.consumes_free_review() {
            // The row lock taken here serializes concurrent uploads for the same user.
            let claimed = sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE review_usage
                SET free_reviews_used = free_reviews_used + 1, updated_at = now()
                WHERE user_id = $1 AND free_reviews_used < $2
                RETURNING free_reviews_used
                "#,
            )
            .bind(review.user_id)
            .bind(free_review_limit)
            .fetch_optional(&mut *tx)
            .await?;

            if claimed.is_none() {
                tx.rollback().await?;
                return Err(AppError::QuotaExceeded);
            }
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (id, user_id, file_name, analysis_type, analysis_result)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, file_name, analysis_type, analysis_result, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review.user_id)
        .bind(&review.file_name)
        .bind(&review.analysis_type)
        .bind(Json(&review.analysis))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Stored review {} for user {} (status {:?})",
            row.id, row.user_id, row.analysis_result.status
        );
        Ok(row)
    }

    async fn list_reviews(&self, user_id: Uuid) -> Result<Vec<ReviewRow>, AppError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_review(&self, user_id: Uuid, id: Uuid) -> Result<Option<ReviewRow>, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_review(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
