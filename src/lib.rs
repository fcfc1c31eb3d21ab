pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::comments::CommentService;
use crate::config::visibility::VisibilityPolicy;
use crate::infra::store::CommentStore;

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub admin_token: Option<String>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CommentStore>,
        visibility: VisibilityPolicy,
        admin_token: Option<String>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            comments: CommentService::new(store, visibility),
            admin_token,
            max_body_bytes,
        }
    }
}
