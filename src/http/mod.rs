use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;
pub mod views;

pub use auth::AdminToken;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let media = ServeDir::new(state.media.dir());
    let body_limit = state.upload_max_bytes;

    Router::new()
        .merge(routes::health())
        .merge(routes::pages())
        .merge(routes::wishes())
        .merge(routes::api())
        .nest_service(views::MEDIA_URL_PREFIX, media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
