use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use crate::{AppError, Ctx, upstream::BROWSER_USER_AGENT};

/// Referer expected by the image CDNs behind the scraped sites
const IMAGE_REFERER: &str = "https://komikindo.ch/";

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub url: String,
}

/// Stream an upstream image through the backend
/// GET /api/proxy/image?url=...
async fn image(
    State(ctx): State<Ctx>,
    Query(params): Query<ImageQuery>,
) -> Result<Response, AppError> {
    if params.url.trim().is_empty() {
        return Err(AppError::Validation("Missing url parameter".to_string()));
    }

    // tolerate double-encoded URLs from the frontend
    let image_url = urlencoding::decode(&params.url)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| params.url.clone());

    let upstream = ctx
        .proxy_client
        .get(&image_url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(
            header::ACCEPT,
            "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8",
        )
        .header(header::REFERER, IMAGE_REFERER)
        .send()
        .await
        .map_err(|e| AppError::Gateway(format!("Failed to fetch image: {e}")))?;

    if !upstream.status().is_success() {
        return Err(AppError::Gateway(format!(
            "Upstream returned status {}",
            upstream.status()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| guess_content_type(&image_url).to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn guess_content_type(url: &str) -> &'static str {
    if url.ends_with(".jpg") || url.ends_with(".jpeg") {
        "image/jpeg"
    } else if url.ends_with(".png") {
        "image/png"
    } else if url.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Mount proxy routes
pub fn mount() -> Router<Ctx> {
    Router::new().route("/proxy/image", get(image))
}
