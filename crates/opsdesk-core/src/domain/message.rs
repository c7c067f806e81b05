//! Message domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::Channel;

/// Who originated a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Parse a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    /// Convert direction to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// How a message was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Written by the operator.
    Manual,
    /// Produced by backend automation.
    Automated,
}

impl MessageKind {
    /// Convert kind to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automated => "automated",
        }
    }
}

/// A single message within a conversation's thread.
///
/// Messages are append-only; the only post-creation mutation the backend
/// performs is setting `read_at`. Thread ordering is by `(sent_at, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    /// Matches the parent conversation's channel.
    pub channel: Channel,
    pub sent_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

/// Cached summary of a conversation's most recent message.
///
/// Kept on the conversation so list rendering never needs the full thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    pub content: String,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
}

impl MessageSummary {
    /// Build a summary from a full message.
    #[must_use]
    pub fn of(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            content: message.content.clone(),
            direction: message.direction,
            kind: message.kind,
            sent_at: message.sent_at,
        }
    }
}
