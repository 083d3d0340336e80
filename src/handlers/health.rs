//! Health check handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use crate::state::AppState;

/// `200` when the database and session store answer, `503` otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.services.health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if status.is_healthy() { "ok" } else { "degraded" },
        "database": status.database_healthy,
        "session_store": status.session_store_healthy,
        "session_backend": status.session_backend,
        "issues": status.get_issues(),
    });

    (code, Json(body))
}
