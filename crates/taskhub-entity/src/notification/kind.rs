//! Notification type enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The domain event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// The user was @-mentioned in a comment.
    Mention,
    TaskAssigned,
    CommentReply,
    ProjectUpdate,
    /// The user was added to a team.
    TeamInvite,
    /// The user (or their team) was added to a project.
    ProjectAssigned,
}

impl NotificationType {
    pub const ALL: [NotificationType; 6] = [
        Self::Mention,
        Self::TaskAssigned,
        Self::CommentReply,
        Self::ProjectUpdate,
        Self::TeamInvite,
        Self::ProjectAssigned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::TaskAssigned => "task_assigned",
            Self::CommentReply => "comment_reply",
            Self::ProjectUpdate => "project_update",
            Self::TeamInvite => "team_invite",
            Self::ProjectAssigned => "project_assigned",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown notification type: {s}"))
    }
}
