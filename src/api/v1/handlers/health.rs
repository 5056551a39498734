/*
 * Responsibility
 * - GET /health (疎通用, 認証なし)
 * - Still passes through the rate headers layer (anonymous bucket)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
