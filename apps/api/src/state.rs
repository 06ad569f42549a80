use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::config::Config;
use crate::reviews::store::ReviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: Arc<ResumeAnalyzer>,
    /// Pluggable persistence. Default: PgReviewStore.
    pub store: Arc<dyn ReviewStore>,
}
