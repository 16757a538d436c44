use crate::startup::AppState;
use axum::{
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

/// Catch-all for unrouted requests.
///
/// The frontend is a separate single-page app, so browser navigations to
/// non-API paths get a pointer to it instead of a bare 404.
pub async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path();

    if method != Method::GET || path == "/api" || path.starts_with("/api/") {
        return AppError::NotFound(anyhow::anyhow!("Route not found: {} {}", method, path))
            .into_response();
    }

    Json(json!({
        "message": format!("Frontend is running on {}", state.config.frontend_url),
        "note": "The React app is served separately from this API",
    }))
    .into_response()
}
