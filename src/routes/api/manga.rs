use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    ApiResponse, ApiResult, AppError, Ctx,
    upstream::{ChapterImages, ContentItem, MangaDetail},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MangaListResponse {
    #[serde(rename = "mangaList")]
    pub manga_list: Vec<ContentItem>,
}

// ============ Handlers ============

/// Trending manga for the homepage
/// GET /api/manga/home
async fn home(State(ctx): State<Ctx>) -> ApiResult<MangaListResponse> {
    let manga_list = ctx.comic.trending().await?;

    Ok(ApiResponse {
        code: 200,
        message: "Manga home retrieved".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Trending manga
/// GET /api/manga/trending
async fn trending(State(ctx): State<Ctx>) -> ApiResult<MangaListResponse> {
    let manga_list = ctx.comic.trending().await?;

    Ok(ApiResponse {
        code: 200,
        message: "Trending manga retrieved".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Recently updated manga
/// GET /api/manga/ongoing?page=...
async fn ongoing(
    State(ctx): State<Ctx>,
    Query(params): Query<PageQuery>,
) -> ApiResult<MangaListResponse> {
    let manga_list = ctx.comic.recent(params.page.unwrap_or(1)).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Ongoing manga retrieved".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Popular manga
/// GET /api/manga/popular?page=...
async fn popular(
    State(ctx): State<Ctx>,
    Query(params): Query<PageQuery>,
) -> ApiResult<MangaListResponse> {
    let manga_list = ctx.comic.popular(params.page.unwrap_or(1)).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Popular manga retrieved".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Search manga by keyword
/// GET /api/manga/search?q=...
async fn search(
    State(ctx): State<Ctx>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<MangaListResponse> {
    if params.q.trim().is_empty() {
        return Err(AppError::Validation(
            "Query param 'q' is required".to_string(),
        ));
    }

    let manga_list = ctx.comic.search(&params.q).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Search completed".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Manga list for a genre
/// GET /api/manga/genre/{slug}
async fn genre(State(ctx): State<Ctx>, Path(slug): Path<String>) -> ApiResult<MangaListResponse> {
    let manga_list = ctx.comic.genre(&slug).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Genre manga retrieved".to_string(),
        data: Some(MangaListResponse { manga_list }),
    })
}

/// Manga detail with chapter list
/// GET /api/manga/{slug}
async fn detail(State(ctx): State<Ctx>, Path(slug): Path<String>) -> ApiResult<MangaDetail> {
    let detail = ctx.comic.detail(&slug).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Detail retrieved".to_string(),
        data: Some(detail),
    })
}

/// Images of a chapter
/// GET /api/manga/chapter/{chapter_id}
async fn chapter(
    State(ctx): State<Ctx>,
    Path(chapter_id): Path<String>,
) -> ApiResult<ChapterImages> {
    let chapter = ctx.comic.chapter(&chapter_id).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Chapter retrieved".to_string(),
        data: Some(chapter),
    })
}

/// Mount manga routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/manga/home", get(home))
        .route("/manga/trending", get(trending))
        .route("/manga/ongoing", get(ongoing))
        .route("/manga/popular", get(popular))
        .route("/manga/search", get(search))
        .route("/manga/genre/{slug}", get(genre))
        .route("/manga/genres/{slug}", get(genre))
        .route("/manga/chapter/{chapter_id}", get(chapter))
        .route("/manga/{slug}", get(detail))
}
