//! Inbox backend client port definition.
//!
//! This port defines the interface the core expects from the REST transport.
//! Implementations attach the auth credential and tenant scoping; the core
//! never sees headers or URLs.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Channel, Conversation, ConversationStatus, Message};

/// Errors surfaced by the transport layer.
///
/// Cloneable so bulk operations can report a per-id error without consuming
/// the original.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The backend answered with a non-success status.
    #[error("backend returned status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when present.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network {
        /// Description of the connection failure.
        message: String,
    },

    /// The backend answered with a body the client could not interpret.
    #[error("invalid response from backend: {message}")]
    InvalidResponse {
        /// Description of what was invalid.
        message: String,
    },
}

/// Server-side query for listing conversations.
///
/// Also reused by the list projection, which applies the same predicate
/// intersection to already-loaded state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    /// Restrict to a single status tab.
    pub status: Option<ConversationStatus>,
    /// Case-insensitive substring match on contact name or last message.
    pub search: Option<String>,
}

impl ConversationFilter {
    /// Filter restricted to one status, no search text.
    #[must_use]
    pub const fn with_status(status: ConversationStatus) -> Self {
        Self {
            status: Some(status),
            search: None,
        }
    }
}

/// Port for the inbox REST backend.
///
/// Every call is tenant-scoped and authenticated by the implementation.
/// Read operations may retry transient failures internally; mutations must
/// not (no idempotency key in this protocol, so a retry risks a duplicate
/// send).
#[async_trait]
pub trait InboxClientPort: Send + Sync {
    /// List conversations visible to the active tenant.
    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, TransportError>;

    /// Fetch the ordered message thread for a conversation.
    async fn thread(&self, conversation_id: &str) -> Result<Vec<Message>, TransportError>;

    /// Send an operator reply; returns the confirmed message.
    async fn send_reply(
        &self,
        conversation_id: &str,
        content: &str,
        channel: Channel,
    ) -> Result<Message, TransportError>;

    /// Mark a conversation resolved; returns the updated record.
    async fn resolve(&self, conversation_id: &str) -> Result<Conversation, TransportError>;

    /// Reopen a resolved conversation; returns the updated record.
    async fn reopen(&self, conversation_id: &str) -> Result<Conversation, TransportError>;

    /// Pause or resume backend automation for a conversation.
    async fn set_automation_paused(
        &self,
        conversation_id: &str,
        paused: bool,
    ) -> Result<Conversation, TransportError>;

    /// Confirm that the operator has read a conversation's inbound messages.
    async fn mark_read(&self, conversation_id: &str) -> Result<(), TransportError>;
}
