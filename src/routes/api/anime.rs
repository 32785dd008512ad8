use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    ApiResponse, ApiResult, AppError, Ctx,
    upstream::{ContentDetail, ContentItem, EpisodeStream, HomeData, LatestEpisode},
};

/// Search request parameters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Pagination parameters
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AnimeListResponse {
    #[serde(rename = "animeList")]
    pub anime_list: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub episodes: Vec<LatestEpisode>,
}

#[derive(Debug, Serialize)]
pub struct ServerUrlResponse {
    pub url: String,
}

// ============ Handlers ============

/// Ongoing and completed anime from the homepage
/// GET /api/anime/home
async fn home(State(ctx): State<Ctx>) -> ApiResult<HomeData> {
    let data = ctx.anime.home().await?;

    Ok(ApiResponse {
        code: 200,
        message: "Home retrieved".to_string(),
        data: Some(data),
    })
}

/// Search anime by keyword
/// GET /api/anime/search?q=...
async fn search(
    State(ctx): State<Ctx>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<AnimeListResponse> {
    if params.q.trim().is_empty() {
        return Err(AppError::Validation(
            "Query param 'q' is required".to_string(),
        ));
    }

    let anime_list = ctx.anime.search(&params.q).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Search completed".to_string(),
        data: Some(AnimeListResponse { anime_list }),
    })
}

/// Ongoing anime list
/// GET /api/anime/ongoing?page=...
async fn ongoing(
    State(ctx): State<Ctx>,
    Query(params): Query<PageQuery>,
) -> ApiResult<AnimeListResponse> {
    let anime_list = ctx.anime.ongoing(params.page.unwrap_or(1)).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Ongoing anime retrieved".to_string(),
        data: Some(AnimeListResponse { anime_list }),
    })
}

/// Completed anime list
/// GET /api/anime/complete?page=...
async fn completed(
    State(ctx): State<Ctx>,
    Query(params): Query<PageQuery>,
) -> ApiResult<AnimeListResponse> {
    let anime_list = ctx.anime.completed(params.page.unwrap_or(1)).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Completed anime retrieved".to_string(),
        data: Some(AnimeListResponse { anime_list }),
    })
}

/// Anime list for a genre
/// GET /api/anime/genre/{slug}
async fn genre(State(ctx): State<Ctx>, Path(slug): Path<String>) -> ApiResult<AnimeListResponse> {
    let anime_list = ctx.anime.genre(&slug).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Genre anime retrieved".to_string(),
        data: Some(AnimeListResponse { anime_list }),
    })
}

/// Anime detail with episode list
/// GET /api/anime/{slug}
async fn detail(State(ctx): State<Ctx>, Path(slug): Path<String>) -> ApiResult<ContentDetail> {
    let detail = ctx.anime.detail(&slug).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Detail retrieved".to_string(),
        data: Some(detail),
    })
}

/// Playback options for an episode, aggregated across providers
/// GET /api/anime/episode/{slug}
async fn episode(State(ctx): State<Ctx>, Path(slug): Path<String>) -> ApiResult<EpisodeStream> {
    let stream = ctx.resolver.resolve(&slug).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Stream resolved".to_string(),
        data: Some(stream),
    })
}

/// Embed URL for a specific server
/// GET /api/anime/server/{id}
async fn server(State(ctx): State<Ctx>, Path(id): Path<String>) -> ApiResult<ServerUrlResponse> {
    let url = ctx.anime.server_url(&id).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Server URL retrieved".to_string(),
        data: Some(ServerUrlResponse { url }),
    })
}

/// Recently released episodes
/// GET /api/anime/latest
async fn latest(State(ctx): State<Ctx>) -> ApiResult<LatestResponse> {
    let episodes = ctx.anime.latest().await?;

    Ok(ApiResponse {
        code: 200,
        message: "Latest episodes retrieved".to_string(),
        data: Some(LatestResponse { episodes }),
    })
}

/// Mount anime routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/anime/home", get(home))
        .route("/anime/ongoing", get(ongoing))
        .route("/anime/complete", get(completed))
        .route("/anime/search", get(search))
        .route("/anime/latest", get(latest))
        .route("/anime/genre/{slug}", get(genre))
        .route("/anime/genres/{slug}", get(genre))
        .route("/anime/episode/{slug}", get(episode))
        .route("/anime/server/{id}", get(server))
        .route("/anime/{slug}", get(detail))
}
