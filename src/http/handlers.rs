use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app::comments::{present, CommentError, NewComment};
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::moderation::ModerationAction;
use crate::http::{AdminToken, AppError};
use crate::infra::store::Cursor;
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 30;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub viewer_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    pub viewer_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

fn parse_cursor(cursor: Option<String>) -> Result<Option<Cursor>, AppError> {
    let Some(cursor) = cursor else {
        return Ok(None);
    };

    let mut parts = cursor.splitn(2, '/');
    let timestamp = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;
    let id = parts
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;

    let timestamp = OffsetDateTime::parse(timestamp, &Rfc3339)
        .map_err(|_| AppError::bad_request("invalid cursor"))?;

    Ok(Some((timestamp, id.to_string())))
}

fn encode_cursor(comment: &Comment) -> Option<String> {
    let timestamp = comment.created_at.format(&Rfc3339).ok()?;
    Some(format!("{}/{}", timestamp, comment.id))
}

fn page_limit(limit: Option<i64>) -> Result<i64, AppError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::bad_request(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(limit)
}

/// Trims a `limit + 1` fetch down to one page and derives the next cursor.
fn into_page(mut comments: Vec<Comment>, limit: i64) -> ListResponse<Comment> {
    let next_cursor = if comments.len() > limit as usize {
        comments.truncate(limit as usize);
        comments.last().and_then(encode_cursor)
    } else {
        None
    };

    ListResponse {
        items: comments,
        next_cursor,
    }
}

fn comment_failure(err: CommentError, target_id: &str, failure: &'static str) -> AppError {
    match err {
        CommentError::Validation(message) => AppError::bad_request(message),
        CommentError::NotFound => AppError::not_found("comment not found"),
        CommentError::Conflict(message) => AppError::conflict(message),
        CommentError::Store(err) => {
            tracing::error!(error = ?err, target_id = %target_id, "{}", failure);
            AppError::internal(failure)
        }
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.comments.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "comment store unreachable");
            "degraded"
        }
    };

    Json(HealthResponse { status })
}

pub async fn create_comment(
    State(state): State<AppState>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let Json(payload) = payload?;
    let story_id = payload.story_id.clone().unwrap_or_default();

    let comment = state
        .comments
        .create(payload)
        .await
        .map_err(|err| comment_failure(err, &story_id, "Failed to create comment"))?;

    tracing::info!(comment_id = %comment.id, story_id = %comment.story_id, "comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .comments
        .get(&id, present(query.viewer_id.as_deref()))
        .await
        .map_err(|err| comment_failure(err, &id, "Failed to load comment"))?;

    Ok(Json(comment))
}

pub async fn list_story_comments(
    Path(story_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Comment>>, AppError> {
    let limit = page_limit(query.limit)?;
    let cursor = parse_cursor(query.cursor)?;

    let comments = state
        .comments
        .list_story(&story_id, present(query.viewer_id.as_deref()), cursor, limit + 1)
        .await
        .map_err(|err| comment_failure(err, &story_id, "Failed to list comments"))?;

    Ok(Json(into_page(comments, limit)))
}

pub async fn list_replies(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Comment>>, AppError> {
    let limit = page_limit(query.limit)?;
    let cursor = parse_cursor(query.cursor)?;

    let replies = state
        .comments
        .list_replies(&id, present(query.viewer_id.as_deref()), cursor, limit + 1)
        .await
        .map_err(|err| comment_failure(err, &id, "Failed to list replies"))?;

    Ok(Json(into_page(replies, limit)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub comment_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub comment_id: String,
    pub liked: bool,
    pub likes: i64,
}

pub async fn like_comment(
    State(state): State<AppState>,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<Json<LikeResponse>, AppError> {
    let Json(payload) = payload?;
    let comment_id = present(payload.comment_id.as_deref())
        .ok_or_else(|| AppError::bad_request("Comment ID is required"))?;
    let user_id = present(payload.user_id.as_deref())
        .ok_or_else(|| AppError::bad_request("User ID is required"))?;

    let like = state
        .comments
        .toggle_like(comment_id, user_id)
        .await
        .map_err(|err| comment_failure(err, comment_id, "Failed to like comment"))?;

    tracing::debug!(comment_id = %comment_id, user_id = %user_id, liked = like.liked, "like toggled");
    Ok(Json(LikeResponse {
        comment_id: comment_id.to_string(),
        liked: like.liked,
        likes: like.likes,
    }))
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerateRequest {
    pub comment_id: Option<Value>,
    pub action: Option<Value>,
    pub is_admin: Option<Value>,
}

/// Loose truthiness: absent, null, false, 0 and "" are all falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateResponse {
    pub comment_id: String,
    pub status: CommentStatus,
    pub message: String,
}

/// The body flag only declares intent; authority comes from the admin token.
pub async fn moderate_comment(
    admin: Result<AdminToken, AppError>,
    State(state): State<AppState>,
    payload: Result<Json<ModerateRequest>, JsonRejection>,
) -> Result<Json<ModerateResponse>, AppError> {
    let Json(payload) = payload?;
    if !is_truthy(payload.is_admin.as_ref()) {
        return Err(AppError::forbidden("Unauthorized: Admin access required"));
    }
    let _admin = admin?;

    let comment_id = present(payload.comment_id.as_ref().and_then(Value::as_str))
        .ok_or_else(|| AppError::bad_request("Comment ID is required"))?;
    let action: ModerationAction = payload
        .action
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|action| action.parse().ok())
        .ok_or_else(|| {
            AppError::bad_request("Invalid action. Must be: approve, moderate, or delete")
        })?;

    let comment = state
        .comments
        .moderate(comment_id, action)
        .await
        .map_err(|err| comment_failure(err, comment_id, "Failed to moderate comment"))?;

    tracing::info!(comment_id = %comment.id, action = action.as_str(), status = %comment.status, "comment moderated");
    Ok(Json(ModerateResponse {
        comment_id: comment.id,
        status: comment.status,
        message: action.success_message(),
    }))
}
