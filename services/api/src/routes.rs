use crate::infra::AppState;
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use cp_checklist::workflows::checklist::{
    catch_panic_layer, checklist_router, ChecklistMailer, ChecklistService, SubmissionStore,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<S, M>(service: Arc<ChecklistService<S, M>>) -> Router
where
    S: SubmissionStore + 'static,
    M: ChecklistMailer + 'static,
{
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .layer(catch_panic_layer())
        .merge(checklist_router(service))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("No route for {}", uri.path()) })),
    )
}
