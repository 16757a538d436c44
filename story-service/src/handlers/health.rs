use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Reports provider configuration without calling out.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "story-service",
        "version": env!("CARGO_PKG_VERSION"),
        "textProvider": state.story.text_provider().is_configured(),
        "imageProvider": state.story.image_provider().is_some(),
    }))
}

/// Readiness probe: the text provider must answer its health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.story.text_provider().health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
