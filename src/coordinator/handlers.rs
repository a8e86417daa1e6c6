use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

use super::service::Coordinator;
use super::types::{AggregateResult, CoordinatorHealthResponse, WorkerHealthView};
use crate::error::CoordinatorError;
use crate::telemetry;
use crate::worker::protocol::{
    ENDPOINT_HEALTH, ENDPOINT_METRICS, ENDPOINT_SEARCH, ErrorResponse, SearchParams,
    SearchRequest,
};

pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route(ENDPOINT_SEARCH, get(handle_search).post(handle_search_body))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_METRICS, get(handle_metrics))
        .layer(Extension(coordinator))
}

pub async fn handle_search(
    Extension(coordinator): Extension<Arc<Coordinator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<AggregateResult>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.q.unwrap_or_default();

    coordinator
        .search(&query, params.algorithm.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn handle_search_body(
    Extension(coordinator): Extension<Arc<Coordinator>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<AggregateResult>, (StatusCode, Json<ErrorResponse>)> {
    coordinator
        .search(&req.q, req.algorithm.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn handle_health(
    Extension(coordinator): Extension<Arc<Coordinator>>,
) -> (StatusCode, Json<CoordinatorHealthResponse>) {
    let registry = coordinator.registry();
    let snapshot = registry.snapshot();

    let response = CoordinatorHealthResponse {
        status: "ok".to_string(),
        snapshot_version: snapshot.version,
        healthy_workers: snapshot.healthy.len(),
        workers: registry
            .records()
            .iter()
            .map(WorkerHealthView::from)
            .collect(),
    };

    (StatusCode::OK, Json(response))
}

pub async fn handle_metrics(
    Extension(coordinator): Extension<Arc<Coordinator>>,
) -> impl IntoResponse {
    match telemetry::render(coordinator.metrics.registry()) {
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

fn error_response(err: CoordinatorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        CoordinatorError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        CoordinatorError::NoWorkersAvailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
