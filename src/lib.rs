pub mod config;
pub mod db;
pub mod entities;
pub mod enrichment;
pub mod error;
pub mod routes;
pub mod upstream;

use std::sync::Arc;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    enrichment::EnrichmentService,
    upstream::{ComicProvider, OtakudesuProvider, StreamResolver},
};

pub use crate::config::AppConfig;
pub use crate::error::AppError;

/// Shared application state passed to every route handler
#[derive(Clone)]
pub struct Ctx {
    pub config: Arc<AppConfig>,
    pub db: SqlitePool,
    pub anime: Arc<OtakudesuProvider>,
    pub comic: Arc<ComicProvider>,
    pub resolver: Arc<StreamResolver>,
    pub enrichment: Arc<EnrichmentService>,
    /// Plain client for the image pass-through (no rate limiting)
    pub proxy_client: reqwest::Client,
}

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Handler result carrying the response envelope
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;
