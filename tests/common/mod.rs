#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use story_comments::config::visibility::VisibilityPolicy;
use story_comments::domain::comment::{Comment, CommentStatus, LikeState};
use story_comments::http::ADMIN_TOKEN_HEADER;
use story_comments::infra::memory_store::MemoryCommentStore;
use story_comments::infra::store::{CommentStore, Cursor, ListFilter, StoreError, UpdateOutcome};
use story_comments::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token-12345";
pub const TEST_MAX_BODY_BYTES: usize = 16 * 1024;

// ---------------------------------------------------------------------------
// TestApp: a router over a fresh in-memory store
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub store: Arc<dyn CommentStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub fn app() -> TestApp {
    TestApp::with_policy(VisibilityPolicy::default())
}

impl TestApp {
    pub fn with_policy(policy: VisibilityPolicy) -> Self {
        Self::build(policy, Some(TEST_ADMIN_TOKEN.to_string()))
    }

    pub fn without_admin_token() -> Self {
        Self::build(VisibilityPolicy::default(), None)
    }

    /// A router over a caller-supplied store, with the default policy and
    /// the test admin token.
    pub fn over_store(store: Arc<dyn CommentStore>) -> Self {
        Self::build_over(
            store,
            VisibilityPolicy::default(),
            Some(TEST_ADMIN_TOKEN.to_string()),
        )
    }

    fn build(policy: VisibilityPolicy, admin_token: Option<String>) -> Self {
        Self::build_over(Arc::new(MemoryCommentStore::new()), policy, admin_token)
    }

    fn build_over(
        store: Arc<dyn CommentStore>,
        policy: VisibilityPolicy,
        admin_token: Option<String>,
    ) -> Self {
        let state = AppState::new(store.clone(), policy, admin_token, TEST_MAX_BODY_BYTES);
        let router = story_comments::http::router(state);
        TestApp { router, store }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body_bytes,
        }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(json_body(&body)), &[])
            .await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> TestResponse {
        self.request(Method::POST, path, Some(Body::from(body)), &[])
            .await
    }

    /// PATCH with an optional admin token in the x-admin-token header.
    pub async fn patch_admin(
        &self,
        path: &str,
        body: Value,
        admin_token: Option<&str>,
    ) -> TestResponse {
        let header = ADMIN_TOKEN_HEADER;
        let mut headers = vec![];
        if let Some(t) = admin_token {
            headers.push((header.as_str(), t));
        }
        self.request(Method::PATCH, path, Some(json_body(&body)), &headers)
            .await
    }

    // ------------------------------------------------------------------
    // Domain helpers
    // ------------------------------------------------------------------

    /// Create a top-level comment through the API. Returns its id.
    pub async fn create_comment(&self, story_id: &str, author_id: &str) -> String {
        self.create_reply(story_id, author_id, None).await
    }

    pub async fn create_reply(
        &self,
        story_id: &str,
        author_id: &str,
        parent_id: Option<&str>,
    ) -> String {
        let resp = self
            .post_json(
                "/comments",
                json!({
                    "storyId": story_id,
                    "authorId": author_id,
                    "author": { "name": "Test Author", "username": author_id },
                    "content": "a comment worth keeping",
                    "parentId": parent_id,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.json());
        resp.json()["id"].as_str().unwrap().to_string()
    }

    pub async fn like(&self, comment_id: &str, user_id: &str) -> TestResponse {
        self.post_json(
            "/comments/like",
            json!({ "commentId": comment_id, "userId": user_id }),
        )
        .await
    }

    pub async fn moderate(&self, comment_id: &str, action: &str) -> TestResponse {
        self.patch_admin(
            "/comments/moderate",
            json!({ "commentId": comment_id, "action": action, "isAdmin": true }),
            Some(TEST_ADMIN_TOKEN),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// FailingStore: every call fails as if the backend returned a bad row
// ---------------------------------------------------------------------------

pub struct FailingStore;

impl FailingStore {
    fn error(id: &str) -> StoreError {
        StoreError::Corrupt {
            id: id.to_string(),
            reason: "unreadable row".to_string(),
        }
    }
}

#[async_trait]
impl CommentStore for FailingStore {
    async fn insert(&self, comment: Comment) -> Result<Comment, StoreError> {
        Err(Self::error(&comment.id))
    }

    async fn get(&self, id: &str) -> Result<Option<Comment>, StoreError> {
        Err(Self::error(id))
    }

    async fn list(
        &self,
        filter: ListFilter<'_>,
        _cursor: Option<Cursor>,
        _limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        Err(Self::error(filter.story_id))
    }

    async fn toggle_like(
        &self,
        id: &str,
        _user_id: &str,
    ) -> Result<UpdateOutcome<LikeState>, StoreError> {
        Err(Self::error(id))
    }

    async fn set_status(
        &self,
        id: &str,
        _target: CommentStatus,
    ) -> Result<UpdateOutcome<Comment>, StoreError> {
        Err(Self::error(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(Self::error("ping"))
    }
}

fn json_body(body: &Value) -> Body {
    Body::from(serde_json::to_string(body).unwrap())
}
