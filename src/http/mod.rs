use axum::http::HeaderName;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{AdminToken, ADMIN_TOKEN_HEADER};
pub use error::AppError;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .merge(routes::health())
        .merge(routes::comments())
        .merge(routes::stories())
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}
