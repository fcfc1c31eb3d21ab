use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::visibility::VisibilityPolicy;
use crate::domain::comment::{AuthorSnapshot, Comment, CommentStatus, LikeState, MAX_CONTENT_CHARS};
use crate::domain::moderation::ModerationAction;
use crate::infra::store::{CommentStore, Cursor, ListFilter, StoreError, UpdateOutcome};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("{0}")]
    Validation(String),
    #[error("comment not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAuthor {
    pub name: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub wallet_address: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewComment {
    pub story_id: Option<String>,
    pub author_id: Option<String>,
    pub author: Option<NewAuthor>,
    pub content: Option<String>,
    pub parent_id: Option<String>,
}

/// Returns the trimmed value, or `None` when it is absent or blank.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn required(value: Option<&str>, message: &str) -> Result<String, CommentError> {
    present(value)
        .map(str::to_string)
        .ok_or_else(|| CommentError::Validation(message.to_string()))
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
    visibility: VisibilityPolicy,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>, visibility: VisibilityPolicy) -> Self {
        Self { store, visibility }
    }

    pub async fn create(&self, input: NewComment) -> Result<Comment, CommentError> {
        let story_id = required(input.story_id.as_deref(), "Story ID is required")?;
        let author_id = required(input.author_id.as_deref(), "Author ID is required")?;
        let author = input.author.unwrap_or_default();
        let name = required(author.name.as_deref(), "Author name is required")?;
        let username = required(author.username.as_deref(), "Author username is required")?;

        let content = required(input.content.as_deref(), "Comment content is required")?;
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(CommentError::Validation(format!(
                "Comment cannot exceed {} characters",
                MAX_CONTENT_CHARS
            )));
        }

        let parent_id = match present(input.parent_id.as_deref()) {
            Some(parent_id) => {
                let parent = self.store.get(parent_id).await?.ok_or_else(|| {
                    CommentError::Validation("Parent comment not found".to_string())
                })?;
                if parent.story_id != story_id {
                    return Err(CommentError::Validation(
                        "Parent comment belongs to a different story".to_string(),
                    ));
                }
                Some(parent.id)
            }
            None => None,
        };

        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            story_id,
            author_id,
            author: AuthorSnapshot {
                name,
                username,
                avatar: author.avatar.unwrap_or_default(),
                wallet_address: present(author.wallet_address.as_deref()).map(str::to_string),
                is_verified: author.is_verified.unwrap_or(false),
            },
            content,
            parent_id,
            status: CommentStatus::Active,
            likes: 0,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert(comment).await?)
    }

    pub async fn get(&self, id: &str, viewer: Option<&str>) -> Result<Comment, CommentError> {
        self.store
            .get(id)
            .await?
            .filter(|comment| self.visibility.can_read(comment, viewer))
            .ok_or(CommentError::NotFound)
    }

    pub async fn list_story(
        &self,
        story_id: &str,
        viewer: Option<&str>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Comment>, CommentError> {
        let filter = ListFilter {
            story_id,
            parent_id: None,
            moderated_author: self.visibility.listed_moderated_author(viewer),
        };
        Ok(self.store.list(filter, cursor, limit).await?)
    }

    pub async fn list_replies(
        &self,
        parent_id: &str,
        viewer: Option<&str>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Comment>, CommentError> {
        let parent = self.get(parent_id, viewer).await?;
        let filter = ListFilter {
            story_id: &parent.story_id,
            parent_id: Some(&parent.id),
            moderated_author: self.visibility.listed_moderated_author(viewer),
        };
        Ok(self.store.list(filter, cursor, limit).await?)
    }

    pub async fn toggle_like(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<LikeState, CommentError> {
        match self.store.toggle_like(comment_id, user_id).await? {
            UpdateOutcome::Applied(state) => Ok(state),
            UpdateOutcome::Missing => Err(CommentError::NotFound),
            UpdateOutcome::Conflict(status) => Err(CommentError::Conflict(format!(
                "cannot like a {} comment",
                status
            ))),
        }
    }

    pub async fn moderate(
        &self,
        comment_id: &str,
        action: ModerationAction,
    ) -> Result<Comment, CommentError> {
        match self.store.set_status(comment_id, action.target_status()).await? {
            UpdateOutcome::Applied(comment) => Ok(comment),
            UpdateOutcome::Missing => Err(CommentError::NotFound),
            UpdateOutcome::Conflict(current) => Err(CommentError::Conflict(format!(
                "cannot {} a {} comment",
                action.as_str(),
                current
            ))),
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
