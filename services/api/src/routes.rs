use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use scheme_desk::analyzer::analyzer_router;
use scheme_desk::risk::RiskModel;
use scheme_desk::tracker::{tracker_router, TrackerService, TrackerStore};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Tracker and analyzer APIs plus the operational endpoints.
pub(crate) fn with_service_routes<S>(
    tracker: Arc<TrackerService<S>>,
    risk: Arc<RiskModel>,
) -> Router
where
    S: TrackerStore + 'static,
{
    tracker_router(tracker)
        .merge(analyzer_router(risk))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
