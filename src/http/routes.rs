use axum::{routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/comments", post(handlers::create_comment))
        .route("/comments/like", post(handlers::like_comment))
        .route("/comments/moderate", patch(handlers::moderate_comment))
        .route("/comments/:id", get(handlers::get_comment))
        .route("/comments/:id/replies", get(handlers::list_replies))
}

pub fn stories() -> Router<AppState> {
    Router::new().route("/stories/:id/comments", get(handlers::list_story_comments))
}
