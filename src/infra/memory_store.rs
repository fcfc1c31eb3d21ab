use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::domain::comment::{Comment, CommentStatus, LikeState};
use crate::infra::store::{CommentStore, Cursor, ListFilter, StoreError, UpdateOutcome};

/// Process-local store. Each mutation runs under the write lock, which makes
/// the read-modify-write atomic.
#[derive(Clone, Default)]
pub struct MemoryCommentStore {
    comments: Arc<RwLock<HashMap<String, Comment>>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn insert(&self, comment: Comment) -> Result<Comment, StoreError> {
        let mut comments = self.comments.write().await;
        comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn get(&self, id: &str) -> Result<Option<Comment>, StoreError> {
        let comments = self.comments.read().await;
        Ok(comments.get(id).cloned())
    }

    async fn list(
        &self,
        filter: ListFilter<'_>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().await;
        let mut matching: Vec<&Comment> = comments
            .values()
            .filter(|comment| filter.matches(comment))
            .filter(|comment| match &cursor {
                Some((created_at, id)) => {
                    (comment.created_at, comment.id.as_str()) < (*created_at, id.as_str())
                }
                None => true,
            })
            .collect();

        matching.sort_by(|a, b| {
            (b.created_at, b.id.as_str()).cmp(&(a.created_at, a.id.as_str()))
        });

        Ok(matching
            .into_iter()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn toggle_like(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<UpdateOutcome<LikeState>, StoreError> {
        let mut comments = self.comments.write().await;
        let Some(comment) = comments.get_mut(id) else {
            return Ok(UpdateOutcome::Missing);
        };
        if comment.status != CommentStatus::Active {
            return Ok(UpdateOutcome::Conflict(comment.status));
        }

        let liked = if comment.liked_by.remove(user_id) {
            false
        } else {
            comment.liked_by.insert(user_id.to_string());
            true
        };
        comment.likes = comment.liked_by.len() as i64;
        comment.updated_at = OffsetDateTime::now_utc();

        Ok(UpdateOutcome::Applied(LikeState {
            liked,
            likes: comment.likes,
        }))
    }

    async fn set_status(
        &self,
        id: &str,
        target: CommentStatus,
    ) -> Result<UpdateOutcome<Comment>, StoreError> {
        let mut comments = self.comments.write().await;
        let Some(comment) = comments.get_mut(id) else {
            return Ok(UpdateOutcome::Missing);
        };
        if !comment.status.can_become(target) {
            return Ok(UpdateOutcome::Conflict(comment.status));
        }

        comment.status = target;
        comment.updated_at = OffsetDateTime::now_utc();
        Ok(UpdateOutcome::Applied(comment.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
