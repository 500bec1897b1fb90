use axum::{Json, response::IntoResponse};
use http::StatusCode;
use serde_json::json;

/// Liveness probe; answers as long as the process serves HTTP
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
