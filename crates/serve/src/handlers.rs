//! HTTP handlers for feedcache serve crate

use crate::mcp::handle_mcp;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use feedcache_core::{CacheStats, FeedCacheError, FetchOutcome, QueryEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

impl AppState {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }
}

/// Routes served by feedcache
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/mcp", post(handle_mcp))
        .route("/api/search", get(handle_search))
        .route("/api/fetch/:id", get(handle_fetch))
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Engine error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub FeedCacheError);

impl From<FeedCacheError> for ApiError {
    fn from(error: FeedCacheError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self.0 {
            FeedCacheError::InvalidQuery { message } => {
                (StatusCode::BAD_REQUEST, "Invalid query".to_string(), Some(message))
            }
            FeedCacheError::Unavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Feed unavailable".to_string(),
                Some(message),
            ),
            other => {
                error!(category = %other.category(), "Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: CacheStats,
}

/// Health check endpoint
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.engine.stats();
    let status = if cache.last_error.is_some() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
        cache,
    })
}

/// GET /api/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.engine.search(&params.q).await?;
    Ok(Json(response))
}

/// GET /api/fetch/:id
pub async fn handle_fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.engine.fetch_by_id(&id).await? {
        FetchOutcome::Found(record) => Ok(Json(record).into_response()),
        FetchOutcome::NotFound { id } => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not found".to_string(),
                details: Some(id),
            }),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let response = ApiError(FeedCacheError::invalid_query("Query cannot be empty")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError(FeedCacheError::unavailable("down")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = ApiError(FeedCacheError::parse("bad")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"error":"Not found"}"#);
    }
}
