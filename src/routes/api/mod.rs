use axum::Router;

use crate::Ctx;

pub mod anime;
pub mod auth;
pub mod bookmarks;
pub mod health;
pub mod manga;
pub mod proxy;

/// Mount all API routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .merge(health::mount())
        .merge(anime::mount())
        .merge(manga::mount())
        .merge(auth::mount())
        .merge(bookmarks::mount())
        .merge(proxy::mount())
}
