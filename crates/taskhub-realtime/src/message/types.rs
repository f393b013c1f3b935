//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taskhub_entity::notification::{Notification, NotificationType};

/// Messages sent by the client.
///
/// Any JSON frame is accepted; only `{"type":"ping"}` has a meaning of its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage {
    Ping,
    /// Missing, non-string or unknown `type`; acknowledged without action.
    Other,
}

impl InboundMessage {
    /// Classify a raw text frame. Fails only when it is not JSON.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(match value.get("type").and_then(Value::as_str) {
            Some("ping") => Self::Ping,
            _ => Self::Other,
        })
    }

    /// The reply to a raw text frame.
    pub fn reply_to(raw: &str) -> OutboundMessage {
        match Self::parse(raw) {
            Ok(Self::Ping) => OutboundMessage::Pong { ts: Utc::now() },
            Ok(Self::Other) => OutboundMessage::Ack,
            Err(e) => OutboundMessage::Error {
                code: "INVALID_MESSAGE".to_string(),
                message: format!("Failed to parse message: {e}"),
            },
        }
    }
}

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Pong {
        ts: DateTime<Utc>,
    },
    Ack,
    /// A user's real-time session opened or closed.
    UserStatusChange {
        user_id: i64,
        online: bool,
    },
    Notification {
        data: NotificationPayload,
    },
    Error {
        code: String,
        message: String,
    },
}

impl OutboundMessage {
    pub fn status_change(user_id: i64, online: bool) -> Self {
        Self::UserStatusChange { user_id, online }
    }

    pub fn notification(notification: &Notification) -> Self {
        Self::Notification {
            data: NotificationPayload::from(notification),
        }
    }
}

/// The persisted notification fields pushed to the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub related_id: Option<i64>,
    pub related_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<&Notification> for NotificationPayload {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title.clone(),
            content: n.content.clone(),
            related_id: n.related_id,
            related_type: n.related_type.clone(),
            created_at: n.created_at,
            is_read: n.is_read,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_ping_gets_pong_with_timestamp() {
        let reply = serde_json::to_value(InboundMessage::reply_to(r#"{"type":"ping"}"#)).unwrap();
        assert_eq!(reply["type"], "pong");
        let ts = reply["ts"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_unknown_type_gets_ack() {
        for raw in [
            r#"{"type":"typing","project":3}"#,
            r#"{"type":"pong"}"#,
            "{}",
            r#"{"foo":"bar"}"#,
            r#"{"type":5}"#,
            r#"{"type":null}"#,
            "[1,2]",
        ] {
            assert_eq!(InboundMessage::reply_to(raw), OutboundMessage::Ack);
        }
    }

    #[test]
    fn test_invalid_frame_gets_error() {
        let reply = serde_json::to_value(InboundMessage::reply_to("hello")).unwrap();
        assert_eq!(reply["type"], "error");
        assert_eq!(reply["code"], "INVALID_MESSAGE");
    }

    #[test]
    fn test_status_change_shape() {
        let msg = serde_json::to_value(OutboundMessage::status_change(5, true)).unwrap();
        assert_eq!(msg, json!({"type": "user_status_change", "user_id": 5, "online": true}));
    }

    #[test]
    fn test_notification_shape() {
        let n = Notification {
            id: 9,
            user_id: 2,
            kind: NotificationType::Mention,
            title: "t".to_string(),
            content: Some("c".to_string()),
            related_id: Some(4),
            related_type: Some("project".to_string()),
            is_read: false,
            created_at: Utc::now(),
        };
        let msg = serde_json::to_value(OutboundMessage::notification(&n)).unwrap();
        assert_eq!(msg["type"], "notification");
        assert_eq!(msg["data"]["id"], 9);
        assert_eq!(msg["data"]["type"], "mention");
        assert_eq!(msg["data"]["is_read"], Value::Bool(false));
        assert!(msg["data"].get("user_id").is_none());
    }
}
