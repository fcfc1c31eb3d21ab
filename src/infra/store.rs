use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::comment::{Comment, CommentStatus, LikeState};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored comment {id} is malformed: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Result of a conditional single-row update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    Applied(T),
    Missing,
    /// The row exists but its current status does not admit the update.
    Conflict(CommentStatus),
}

/// Keyset cursor: the (created_at, id) of the last comment already seen.
pub type Cursor = (OffsetDateTime, String);

#[derive(Debug, Clone, Copy)]
pub struct ListFilter<'a> {
    pub story_id: &'a str,
    /// `None` lists top-level comments.
    pub parent_id: Option<&'a str>,
    /// Moderated comments by this author are listed alongside active ones.
    pub moderated_author: Option<&'a str>,
}

impl ListFilter<'_> {
    pub fn matches(&self, comment: &Comment) -> bool {
        if comment.story_id != self.story_id || comment.parent_id.as_deref() != self.parent_id {
            return false;
        }
        match comment.status {
            CommentStatus::Active => true,
            CommentStatus::Moderated => self.moderated_author == Some(comment.author_id.as_str()),
            CommentStatus::Deleted => false,
        }
    }
}

/// Persistence for comments. Mutations are single atomic conditional updates
/// so concurrent likes and moderation never lose a write.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<Comment, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Comment>, StoreError>;

    /// Newest first, ordered by (created_at, id) descending.
    async fn list(
        &self,
        filter: ListFilter<'_>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError>;

    /// Flips `user_id`'s membership in `liked_by` and moves `likes` with it.
    /// Only active comments can be liked.
    async fn toggle_like(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<UpdateOutcome<LikeState>, StoreError>;

    /// Moves the comment to `target` if its current status is one of
    /// `target.allowed_sources()`.
    async fn set_status(
        &self,
        id: &str,
        target: CommentStatus,
    ) -> Result<UpdateOutcome<Comment>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
