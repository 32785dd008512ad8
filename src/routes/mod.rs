pub mod api;

use axum::{Router, routing::get};

use crate::Ctx;

/// Build the full application router
pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/", get(|| async { "Nonton backend running" }))
        .nest("/api", api::mount())
}
