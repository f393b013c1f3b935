//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::NotificationType;

/// A notification owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    /// The recipient.
    pub user_id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: Option<String>,
    /// Id of the entity the notification refers to.
    pub related_id: Option<i64>,
    /// Kind of the related entity, e.g. `task` or `project`.
    pub related_type: Option<String>,
    /// Only ever transitions from `false` to `true`.
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification. Notifications are always created
/// unread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub related_id: Option<i64>,
    pub related_type: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: i64, kind: NotificationType, title: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            content: None,
            related_id: None,
            related_type: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attach the entity this notification refers to.
    pub fn related_to(mut self, related_type: impl Into<String>, related_id: i64) -> Self {
        self.related_type = Some(related_type.into());
        self.related_id = Some(related_id);
        self
    }
}
