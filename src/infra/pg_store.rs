use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::comment::{AuthorSnapshot, Comment, CommentStatus, LikeState};
use crate::infra::db::Db;
use crate::infra::store::{CommentStore, Cursor, ListFilter, StoreError, UpdateOutcome};

const COMMENT_COLUMNS: &str = "id, story_id, author_id, author_name, author_username, \
     author_avatar, author_wallet_address, author_is_verified, content, parent_id, \
     status, likes, liked_by, created_at, updated_at";

const VISIBLE_IN_LISTING: &str = "story_id = $1 \
     AND parent_id IS NOT DISTINCT FROM $2 \
     AND (status = 'active' OR (status = 'moderated' AND author_id = $3))";

#[derive(Clone)]
pub struct PgCommentStore {
    db: Db,
}

impl PgCommentStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn current_status(&self, id: &str) -> Result<Option<CommentStatus>, StoreError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        status
            .map(|value| parse_status(id, &value))
            .transpose()
    }
}

fn parse_status(id: &str, value: &str) -> Result<CommentStatus, StoreError> {
    CommentStatus::from_db(value).ok_or_else(|| StoreError::Corrupt {
        id: id.to_string(),
        reason: format!("unknown status {}", value),
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, StoreError> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let liked_by: Vec<String> = row.try_get("liked_by")?;

    Ok(Comment {
        status: parse_status(&id, &status)?,
        story_id: row.try_get("story_id")?,
        author_id: row.try_get("author_id")?,
        author: AuthorSnapshot {
            name: row.try_get("author_name")?,
            username: row.try_get("author_username")?,
            avatar: row.try_get("author_avatar")?,
            wallet_address: row.try_get("author_wallet_address")?,
            is_verified: row.try_get("author_is_verified")?,
        },
        content: row.try_get("content")?,
        parent_id: row.try_get("parent_id")?,
        likes: row.try_get("likes")?,
        liked_by: liked_by.into_iter().collect(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        id,
    })
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn insert(&self, comment: Comment) -> Result<Comment, StoreError> {
        let liked_by: Vec<String> = comment.liked_by.iter().cloned().collect();
        let row = sqlx::query(&format!(
            "INSERT INTO comments (id, story_id, author_id, author_name, author_username, \
             author_avatar, author_wallet_address, author_is_verified, content, parent_id, \
             status, likes, liked_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(&comment.id)
        .bind(&comment.story_id)
        .bind(&comment.author_id)
        .bind(&comment.author.name)
        .bind(&comment.author.username)
        .bind(&comment.author.avatar)
        .bind(&comment.author.wallet_address)
        .bind(comment.author.is_verified)
        .bind(&comment.content)
        .bind(&comment.parent_id)
        .bind(comment.status.as_db())
        .bind(comment.likes)
        .bind(liked_by)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(self.db.pool())
        .await?;

        comment_from_row(&row)
    }

    async fn get(&self, id: &str) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list(
        &self,
        filter: ListFilter<'_>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let rows = match cursor {
            Some((created_at, comment_id)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM comments \
                     WHERE {} \
                       AND (created_at < $4 OR (created_at = $4 AND id < $5)) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $6",
                    COMMENT_COLUMNS, VISIBLE_IN_LISTING
                ))
                .bind(filter.story_id)
                .bind(filter.parent_id)
                .bind(filter.moderated_author)
                .bind(created_at)
                .bind(comment_id)
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM comments \
                     WHERE {} \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $4",
                    COMMENT_COLUMNS, VISIBLE_IN_LISTING
                ))
                .bind(filter.story_id)
                .bind(filter.parent_id)
                .bind(filter.moderated_author)
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(comment_from_row).collect()
    }

    async fn toggle_like(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<UpdateOutcome<LikeState>, StoreError> {
        // SET expressions see the pre-update row, RETURNING sees the new one.
        let row = sqlx::query(
            "UPDATE comments SET \
               liked_by = CASE WHEN $2 = ANY(liked_by) \
                 THEN array_remove(liked_by, $2) ELSE array_append(liked_by, $2) END, \
               likes = CASE WHEN $2 = ANY(liked_by) THEN likes - 1 ELSE likes + 1 END, \
               updated_at = NOW() \
             WHERE id = $1 AND status = 'active' \
             RETURNING ($2 = ANY(liked_by)) AS liked, likes",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        if let Some(row) = row {
            return Ok(UpdateOutcome::Applied(LikeState {
                liked: row.try_get("liked")?,
                likes: row.try_get("likes")?,
            }));
        }

        Ok(match self.current_status(id).await? {
            Some(status) => UpdateOutcome::Conflict(status),
            None => UpdateOutcome::Missing,
        })
    }

    async fn set_status(
        &self,
        id: &str,
        target: CommentStatus,
    ) -> Result<UpdateOutcome<Comment>, StoreError> {
        let sources: Vec<String> = target
            .allowed_sources()
            .iter()
            .map(|status| status.as_db().to_string())
            .collect();

        let row = sqlx::query(&format!(
            "UPDATE comments SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(target.as_db())
        .bind(sources)
        .fetch_optional(self.db.pool())
        .await?;

        if let Some(row) = row {
            return Ok(UpdateOutcome::Applied(comment_from_row(&row)?));
        }

        Ok(match self.current_status(id).await? {
            Some(status) => UpdateOutcome::Conflict(status),
            None => UpdateOutcome::Missing,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }
}
