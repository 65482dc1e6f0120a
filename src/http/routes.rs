use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn pages() -> Router<AppState> {
    Router::new().route("/", get(handlers::index))
}

/// Form-style endpoints the server-rendered page posts to.
pub fn wishes() -> Router<AppState> {
    Router::new()
        .route("/post-wish", post(handlers::post_wish))
        .route("/like-wish/:id", post(handlers::like_wish))
        .route("/add-comment/:id", post(handlers::add_comment))
}

pub fn api() -> Router<AppState> {
    Router::new()
        .route("/api/wishes", get(handlers::list_wishes))
        .route("/api/wishes", post(handlers::post_wish))
        .route("/api/wishes/:id", delete(handlers::delete_wish))
        .route("/api/wishes/:id/like", post(handlers::like_wish))
        .route("/api/wishes/:id/comments", post(handlers::add_comment))
}
