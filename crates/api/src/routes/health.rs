use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the search index answered.
    pub index_healthy: bool,
    /// Number of stored articles, when the index answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<u64>,
}

/// GET /health -- returns service and search index health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let article_count = match state.index.dump(None, 1, 1).await {
        Ok(page) => Some(page.total_count),
        Err(err) => {
            tracing::warn!(error = %err, "Health check: search index unavailable");
            None
        }
    };
    let index_healthy = article_count.is_some();

    let status = if index_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        index_healthy,
        article_count,
    })
}

/// Mount health check routes (root level, outside the article API prefix).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
