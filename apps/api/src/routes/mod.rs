pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::reviews::handlers as reviews;
use crate::state::AppState;

/// Room for multipart boundaries and the non-file fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(analysis::handle_analyze))
        // Review API
        .route(
            "/api/v1/reviews",
            post(reviews::handle_create_review).get(reviews::handle_list_reviews),
        )
        .route(
            "/api/v1/reviews/:id",
            get(reviews::handle_get_review).delete(reviews::handle_delete_review),
        )
        .route("/api/v1/usage", get(reviews::handle_get_usage))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::rules::AnalysisRules;
    use crate::analysis::ResumeAnalyzer;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::reviews::models::{NewReview, ReviewRow, ReviewStatus, ReviewUsageRow};
    use crate::reviews::store::memory::InMemoryReviewStore;
    use crate::reviews::store::ReviewStore;

    const BOUNDARY: &str = "review-test-boundary";

    const RESUME: &str = "SUMMARY\nBackend engineer working in Python, python and PYTHON.\n\n\
        EXPERIENCE: Led team of 5 engineers, increased revenue 20%, managed project roadmap\n\n\
        EDUCATION\nBSc\n\nSKILLS\nDocker, Kubernetes";

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            free_review_limit: 3,
            analysis_delay_ms: 0,
            max_upload_bytes: 1024,
        }
    }

    fn app(store: Arc<InMemoryReviewStore>) -> Router {
        app_with(store, ResumeAnalyzer::default())
    }

    fn app_with(store: Arc<dyn ReviewStore>, analyzer: ResumeAnalyzer) -> Router {
        build_router(AppState {
            config: test_config(),
            analyzer: Arc::new(analyzer),
            store,
        })
    }

    /// Fails every completed insert, as a dropped database connection would.
    #[derive(Default)]
    struct FailingCompletedStore {
        inner: InMemoryReviewStore,
    }

    #[async_trait]
    impl ReviewStore for FailingCompletedStore {
        async fn ensure_usage(&self, user_id: Uuid) -> Result<ReviewUsageRow, AppError> {
            self.inner.ensure_usage(user_id).await
        }

        async fn record_review(
            &self,
            review: NewReview,
            free_review_limit: i32,
        ) -> Result<ReviewRow, AppError> {
            if review.analysis.status == ReviewStatus::Completed {
                return Err(AppError::Internal(anyhow::anyhow!("connection reset")));
            }
            self.inner.record_review(review, free_review_limit).await
        }

        async fn list_reviews(&self, user_id: Uuid) -> Result<Vec<ReviewRow>, AppError> {
            self.inner.list_reviews(user_id).await
        }

        async fn get_review(
            &self,
            user_id: Uuid,
            id: Uuid,
        ) -> Result<Option<ReviewRow>, AppError> {
            self.inner.get_review(user_id, id).await
        }

        async fn delete_review(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
            self.inner.delete_review(user_id, id).await
        }
    }

    fn multipart_request(user_id: &str, file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/reviews")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::default()).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_returns_result() {
        let response = app(Arc::default())
            .oneshot(json_request("/api/v1/analysis", json!({ "text": RESUME })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let score = body["score"].as_u64().unwrap();
        assert!(score <= 100);
        assert_eq!(body["details"]["experience"]["leadership"], true);
        assert!(body["messages"]["intro"]
            .as_str()
            .unwrap()
            .contains(&format!("{score}%")));
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_string_and_empty_text() {
        for payload in [json!({ "text": 42 }), json!({ "text": "" }), json!({})] {
            let response = app(Arc::default())
                .oneshot(json_request("/api/v1/analysis", payload.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_upload_stores_completed_review_and_counts_usage() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(InMemoryReviewStore::default());

        let response = app(store.clone())
            .oneshot(multipart_request(&user_id.to_string(), "cv.txt", RESUME.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["file_name"], "cv.txt");
        assert_eq!(body["analysis_type"], "free");
        assert_eq!(body["analysis_result"]["status"], "completed");
        assert!(body["analysis_result"]["summary"]["score"].is_u64());

        let stored = store.reviews();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].analysis_result.status, ReviewStatus::Completed);

        let usage = app(store.clone())
            .oneshot(get_request(&format!("/api/v1/usage?user_id={user_id}")))
            .await
            .unwrap();
        let usage = body_json(usage).await;
        assert_eq!(usage["free_reviews_used"], 1);
        assert_eq!(usage["remaining"], 2);
    }

    #[tokio::test]
    async fn test_upload_over_quota_is_rejected() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(InMemoryReviewStore::with_usage(user_id, 3));

        let response = app(store.clone())
            .oneshot(multipart_request(&user_id.to_string(), "cv.txt", RESUME.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body_json(response).await["error"]["code"], "QUOTA_EXCEEDED");
        assert!(store.reviews().is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_text_is_unprocessable() {
        let store = Arc::new(InMemoryReviewStore::default());
        let response = app(store.clone())
            .oneshot(multipart_request(&Uuid::new_v4().to_string(), "blank.txt", b" \r\n\t"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Could not extract text from file"
        );
        assert!(store.reviews().is_empty());
    }

    #[tokio::test]
    async fn test_upload_too_large_is_rejected() {
        let store = Arc::new(InMemoryReviewStore::default());
        let content = vec![b'a'; 2048];
        let response = app(store.clone())
            .oneshot(multipart_request(&Uuid::new_v4().to_string(), "big.txt", &content))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "File size must be less than 1KB"
        );
        assert!(store.reviews().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_cannot_exceed_quota() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(InMemoryReviewStore::with_usage(user_id, 2));
        let analyzer = ResumeAnalyzer::new(AnalysisRules::default(), Duration::from_millis(50));
        let router = app_with(store.clone(), analyzer);

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let request =
                    multipart_request(&user_id.to_string(), &format!("cv{i}.txt"), RESUME.as_bytes());
                tokio::spawn(router.clone().oneshot(request))
            })
            .collect();

        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap().unwrap().status());
        }

        let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
        let rejected = statuses
            .iter()
            .filter(|s| **s == StatusCode::PAYMENT_REQUIRED)
            .count();
        assert_eq!((created, rejected), (1, 4), "{statuses:?}");
        assert_eq!(store.reviews().len(), 1);
        assert_eq!(store.free_reviews_used(user_id), Some(3));
    }

    #[tokio::test]
    async fn test_failed_store_of_result_records_error_review() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(FailingCompletedStore::default());

        let response = app_with(store.clone(), ResumeAnalyzer::default())
            .oneshot(multipart_request(&user_id.to_string(), "cv.txt", RESUME.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let stored = store.inner.reviews();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].file_name, "cv.txt");
        assert_eq!(stored[0].analysis_result.status, ReviewStatus::Error);
        assert!(stored[0].analysis_result.summary.is_none());
        assert_eq!(store.inner.free_reviews_used(user_id), Some(0));
    }

    #[tokio::test]
    async fn test_unparseable_pdf_is_unprocessable() {
        let store = Arc::new(InMemoryReviewStore::default());
        let response = app(store.clone())
            .oneshot(multipart_request(
                &Uuid::new_v4().to_string(),
                "cv.pdf",
                b"%PDF-1.4 truncated",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Failed to parse PDF file"
        );
        assert!(store.reviews().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_valid_user_id() {
        let response = app(Arc::default())
            .oneshot(multipart_request("not-a-uuid", "cv.txt", RESUME.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_get_and_delete_reviews() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(InMemoryReviewStore::default());

        for name in ["first.txt", "second.txt"] {
            let response = app(store.clone())
                .oneshot(multipart_request(&user_id.to_string(), name, RESUME.as_bytes()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let list = app(store.clone())
            .oneshot(get_request(&format!("/api/v1/reviews?user_id={user_id}")))
            .await
            .unwrap();
        let list = body_json(list).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["file_name"], "second.txt");

        let id = list[0]["id"].as_str().unwrap().to_string();
        let found = app(store.clone())
            .oneshot(get_request(&format!("/api/v1/reviews/{id}?user_id={user_id}")))
            .await
            .unwrap();
        assert_eq!(found.status(), StatusCode::OK);

        let other_user = app(store.clone())
            .oneshot(get_request(&format!(
                "/api/v1/reviews/{id}?user_id={}",
                Uuid::new_v4()
            )))
            .await
            .unwrap();
        assert_eq!(other_user.status(), StatusCode::NOT_FOUND);

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/reviews/{id}?user_id={user_id}"))
            .body(Body::empty())
            .unwrap();
        let deleted = app(store.clone()).oneshot(delete).await.unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = app(store.clone())
            .oneshot(get_request(&format!("/api/v1/reviews/{id}?user_id={user_id}")))
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.reviews().len(), 1);
    }
}
