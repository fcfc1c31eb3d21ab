use std::str::FromStr;

use anyhow::anyhow;

use crate::domain::comment::{Comment, CommentStatus};

/// Who can still read a comment after a moderator hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratedVisibility {
    /// The author keeps seeing it, both by id and in listings.
    Author,
    Hidden,
}

/// How far a soft-deleted comment disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedVisibility {
    /// Excluded from every read.
    Hidden,
    /// Excluded from listings but still readable by id.
    Direct,
}

impl FromStr for ModeratedVisibility {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "author" => Ok(Self::Author),
            "hidden" => Ok(Self::Hidden),
            other => Err(anyhow!("expected author or hidden, got {}", other)),
        }
    }
}

impl FromStr for DeletedVisibility {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hidden" => Ok(Self::Hidden),
            "direct" => Ok(Self::Direct),
            other => Err(anyhow!("expected hidden or direct, got {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub moderated: ModeratedVisibility,
    pub deleted: DeletedVisibility,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            moderated: ModeratedVisibility::Author,
            deleted: DeletedVisibility::Hidden,
        }
    }
}

impl VisibilityPolicy {
    /// Whether `viewer` may read this comment by id.
    pub fn can_read(&self, comment: &Comment, viewer: Option<&str>) -> bool {
        match comment.status {
            CommentStatus::Active => true,
            CommentStatus::Moderated => {
                self.moderated == ModeratedVisibility::Author
                    && viewer == Some(comment.author_id.as_str())
            }
            CommentStatus::Deleted => self.deleted == DeletedVisibility::Direct,
        }
    }

    /// The author whose moderated comments stay in listings, if any.
    /// Deleted comments are never listed.
    pub fn listed_moderated_author<'a>(&self, viewer: Option<&'a str>) -> Option<&'a str> {
        match self.moderated {
            ModeratedVisibility::Author => viewer,
            ModeratedVisibility::Hidden => None,
        }
    }
}
