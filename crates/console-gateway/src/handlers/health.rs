//! Health check handler (no auth required).

use axum::Json;

use crate::dto::response::HealthResponse;

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
