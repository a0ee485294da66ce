use crate::model::HealthResponse;
use axum::Json;

/// Liveness only; the store is not consulted.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
