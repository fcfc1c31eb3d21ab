use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::comment::CommentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Moderate,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction;

impl FromStr for ModerationAction {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "approve" => Ok(Self::Approve),
            "moderate" => Ok(Self::Moderate),
            "delete" => Ok(Self::Delete),
            _ => Err(UnknownAction),
        }
    }
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Moderate => "moderate",
            Self::Delete => "delete",
        }
    }

    pub fn target_status(&self) -> CommentStatus {
        match self {
            Self::Approve => CommentStatus::Active,
            Self::Moderate => CommentStatus::Moderated,
            Self::Delete => CommentStatus::Deleted,
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Moderate => "moderated",
            Self::Delete => "deleted",
        }
    }

    pub fn success_message(&self) -> String {
        format!("Comment {} successfully", self.past_tense())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_map_to_statuses() {
        assert_eq!("approve".parse::<ModerationAction>().map(|a| a.target_status()), Ok(CommentStatus::Active));
        assert_eq!("moderate".parse::<ModerationAction>().map(|a| a.target_status()), Ok(CommentStatus::Moderated));
        assert_eq!("delete".parse::<ModerationAction>().map(|a| a.target_status()), Ok(CommentStatus::Deleted));
    }

    #[test]
    fn unknown_and_miscased_actions_are_rejected() {
        assert_eq!("ban".parse::<ModerationAction>(), Err(UnknownAction));
        assert_eq!("Delete".parse::<ModerationAction>(), Err(UnknownAction));
        assert_eq!("".parse::<ModerationAction>(), Err(UnknownAction));
    }

    #[test]
    fn success_message_uses_past_tense() {
        assert_eq!(ModerationAction::Delete.success_message(), "Comment deleted successfully");
        assert_eq!(ModerationAction::Approve.success_message(), "Comment approved successfully");
    }
}
