use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    ApiResponse, ApiResult, AppError, Ctx,
    entities::{Bookmark, NewBookmark, Session},
};

/// Resolve the bearer token to a user id
async fn authenticate(ctx: &Ctx, auth: &Authorization<Bearer>) -> Result<i64, AppError> {
    Session::find_user(&ctx.db, auth.token())
        .await?
        .ok_or(AppError::Unauthorized)
}

// ============ Handlers ============

/// Save a bookmark
/// POST /api/bookmarks
async fn add(
    State(ctx): State<Ctx>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<NewBookmark>,
) -> ApiResult<()> {
    let user_id = authenticate(&ctx, &auth).await?;

    if req.kind.trim().is_empty() || req.slug.trim().is_empty() {
        return Err(AppError::Validation(
            "Fields 'type' and 'slug' are required".to_string(),
        ));
    }

    Bookmark::insert(&ctx.db, user_id, &req).await?;

    Ok(ApiResponse {
        code: 201,
        message: "Bookmark added".to_string(),
        data: None,
    })
}

/// List the user's bookmarks
/// GET /api/bookmarks
async fn list(
    State(ctx): State<Ctx>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> ApiResult<Vec<Bookmark>> {
    let user_id = authenticate(&ctx, &auth).await?;

    let bookmarks = Bookmark::list_for_user(&ctx.db, user_id).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Bookmarks retrieved".to_string(),
        data: Some(bookmarks),
    })
}

/// Remove a bookmark by id
/// DELETE /api/bookmarks/{id}
async fn remove(
    State(ctx): State<Ctx>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let user_id = authenticate(&ctx, &auth).await?;

    Bookmark::delete_for_user(&ctx.db, user_id, id).await?;

    Ok(ApiResponse {
        code: 200,
        message: "Bookmark removed".to_string(),
        data: None,
    })
}

/// Mount bookmark routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/bookmarks", get(list).post(add))
        .route("/bookmarks/{id}", delete(remove))
}
