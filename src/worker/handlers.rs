use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

use super::protocol::*;
use super::service::WorkerService;
use crate::error::WorkerError;
use crate::telemetry;

pub fn router(service: Arc<WorkerService>) -> Router {
    Router::new()
        .route(ENDPOINT_SEARCH, get(handle_search).post(handle_search_body))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_METRICS, get(handle_metrics))
        .layer(Extension(service))
}

pub async fn handle_search(
    Extension(service): Extension<Arc<WorkerService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.q.unwrap_or_default();

    service
        .handle_search(&query, params.algorithm.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn handle_search_body(
    Extension(service): Extension<Arc<WorkerService>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    service
        .handle_search(&req.q, req.algorithm.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn handle_health(
    Extension(service): Extension<Arc<WorkerService>>,
) -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(service.handle_health()))
}

pub async fn handle_metrics(
    Extension(service): Extension<Arc<WorkerService>>,
) -> impl IntoResponse {
    match telemetry::render(service.metrics.registry()) {
        Ok((content_type, body)) => (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body),
        Err(e) => {
            tracing::error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain".to_string())],
                e.to_string(),
            )
        }
    }
}

fn error_response(err: WorkerError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        WorkerError::InvalidQuery(_) | WorkerError::AlgorithmMismatch { .. } => {
            tracing::debug!("Rejected search: {}", err);
            StatusCode::BAD_REQUEST
        }
        WorkerError::Pool(_) => {
            tracing::error!("Search failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
