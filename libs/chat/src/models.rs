use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Delivery progress of an outgoing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    /// Only set on outgoing messages
    pub status: Option<DeliveryStatus>,
    /// Lifetime of an ephemeral message
    pub ephemeral_seconds: Option<u32>,
}

impl Message {
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            direction: Direction::Outgoing,
            status: Some(DeliveryStatus::Sent),
            ephemeral_seconds: None,
        }
    }

    pub fn incoming(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            direction: Direction::Incoming,
            status: None,
            ephemeral_seconds: None,
        }
    }

    pub fn ephemeral(mut self, seconds: u32) -> Self {
        self.ephemeral_seconds = Some(seconds);
        self
    }

    /// Clock time shown next to the bubble, e.g. `10:32 AM`
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format("%-I:%M %p").to_string()
    }

    /// Seconds until an ephemeral message disappears, floored at zero
    ///
    /// `None` for messages that do not expire.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        let lifetime = self.ephemeral_seconds?;
        let expires_at = self.timestamp + Duration::seconds(lifetime as i64);

        Some((expires_at - now).num_seconds().max(0) as u64)
    }
}

/// A conversation with one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub participant_name: String,
    /// Set when the conversation uses disappearing messages
    pub ephemeral_seconds: Option<u32>,
}

/// Row in the conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPreview {
    pub id: String,
    pub name: String,
    pub last_message: String,
    pub timestamp_label: String,
    pub unread: u32,
}
