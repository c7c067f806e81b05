//! Conversation domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact::Contact;
use super::message::MessageSummary;

/// Delivery channel of a conversation, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    /// Parse a channel from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            _ => None,
        }
    }

    /// Convert channel to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a conversation.
///
/// Conversations are created by the backend on first inbound contact and
/// move between `Open` and `Resolved` through explicit operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Resolved,
}

impl ConversationStatus {
    /// Parse a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Convert status to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contact-scoped dialogue over a single channel.
///
/// Invariants maintained by the store:
/// - `unread_count` is zero iff every inbound message's read marker is set
/// - `last_message.sent_at` equals the newest loaded thread entry's `sent_at`
/// - `last_message_at` never decreases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    /// Owning tenant scope.
    pub business_id: String,
    pub contact: Contact,
    pub channel: Channel,
    pub status: ConversationStatus,
    pub last_message_at: DateTime<Utc>,
    /// Server-side modification stamp, the ordering clock for reconciling
    /// push updates against local mutations.
    pub updated_at: DateTime<Utc>,
    /// Suppresses automated outbound replies while set.
    pub automation_paused: bool,
    /// Inbound messages not yet marked read by the operator.
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageSummary>,
}
