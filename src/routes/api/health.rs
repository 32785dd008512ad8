use axum::{Router, routing::get};

use crate::{ApiResponse, Ctx};

/// Liveness probe
/// GET /api/health
async fn health() -> ApiResponse<String> {
    ApiResponse {
        code: 200,
        message: "ok".to_string(),
        data: Some("ok".to_string()),
    }
}

/// Mount health routes
pub fn mount() -> Router<Ctx> {
    Router::new().route("/health", get(health))
}
