use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored notification, addressable by its unique integer id.
///
/// Ids are assigned by the server, strictly increasing from 1, and never
/// reused. `created_at` goes over the wire as a fixed-locale display string
/// (see [`created_at_format`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(rename = "createdAt", with = "created_at_format")]
    pub created_at: DateTime<Utc>,
}

/// WebSocket events a client may send to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Associate this connection with an application user identity.
    Register { identity: String },

    /// Request a notification be flagged as read.
    MarkAsRead { notification_id: u64 },
}

/// WebSocket events the server sends to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full notification history, oldest first. Sent once after register.
    History { notifications: Vec<Notification> },

    /// Current number of unread notifications. Sent after register and
    /// after every read-state change.
    UnreadCount { count: usize },

    /// A freshly created notification, targeted or broadcast.
    NewNotification { notification: Notification },

    /// Confirmation that a notification was marked read. Sent only to the
    /// client that requested it.
    NotificationRead { notification_id: u64 },
}

/// Body of `POST /notifications`.
///
/// `title` and `message` are optional here so the server can answer a
/// missing field with its own validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Identity to deliver to. Absent, or not currently connected, means
    /// broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub success: bool,
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Serialize `created_at` as `dd/mm/yyyy HH:MM:SS`, the display format the
/// notification UI shows verbatim.
pub mod created_at_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y %H:%M:%S";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
