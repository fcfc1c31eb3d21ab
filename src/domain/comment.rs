use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const MAX_CONTENT_CHARS: usize = 1000;

/// Author details copied into the comment when it is written.
/// Later profile edits do not propagate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub story_id: String,
    pub author_id: String,
    pub author: AuthorSnapshot,
    pub content: String,
    pub parent_id: Option<String>,
    pub status: CommentStatus,
    pub likes: i64,
    pub liked_by: BTreeSet<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Deleted,
    Moderated,
}

impl CommentStatus {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            "moderated" => Some(Self::Moderated),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
            Self::Moderated => "moderated",
        }
    }

    /// Statuses a comment may be in for a move to `self` to be accepted.
    /// Re-applying the current status is always allowed.
    pub fn allowed_sources(&self) -> &'static [CommentStatus] {
        match self {
            Self::Active => &[Self::Active, Self::Moderated],
            Self::Moderated => &[Self::Moderated, Self::Active],
            Self::Deleted => &[Self::Deleted, Self::Active],
        }
    }

    pub fn can_become(&self, target: CommentStatus) -> bool {
        target.allowed_sources().contains(self)
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}
