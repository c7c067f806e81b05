//! Canonical event unions for the inbox core.
//!
//! This module is the single source of truth for the two event flows:
//!
//! - [`RealtimeEvent`] - push events arriving from the backend (consumed by
//!   the store during reconciliation)
//! - [`StoreChange`] - change notifications the store emits so subscribed
//!   views know what to re-render
//!
//! # Wire Format
//!
//! Realtime events are serialized with a `type` tag matching the backend's
//! push event names:
//!
//! ```json
//! { "type": "new-message", "message": { "id": "msg_1", ... } }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Conversation, Message};

/// A push event delivered over the realtime channel.
///
/// Delivery is at-least-once and unordered relative to REST responses; the
/// store's reconciliation tolerates duplicates and out-of-order arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    /// A message was appended to some conversation's thread.
    NewMessage {
        /// The full message payload, carrying its conversation id.
        message: Message,
    },

    /// A conversation's metadata changed server-side.
    ///
    /// Applies to metadata only; thread content is never carried here.
    ConversationUpdate {
        /// The full replacement conversation record.
        conversation: Conversation,
    },
}

impl RealtimeEvent {
    /// Get the event name as it appears on the push channel.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new-message",
            Self::ConversationUpdate { .. } => "conversation-update",
        }
    }
}

/// A change notification emitted by the store after state it owns moved.
///
/// Views subscribe to these and re-read the store snapshot; the variants
/// carry just enough to scope the re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    /// The conversation set was replaced (fetch or bulk action).
    ConversationsChanged,

    /// A single conversation's metadata changed.
    ConversationChanged {
        /// Id of the changed conversation.
        id: String,
    },

    /// The loaded thread changed (fetch, confirmed reply, or push append).
    ThreadChanged {
        /// Id of the conversation whose thread changed.
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },

    /// The active conversation changed.
    SelectionChanged {
        /// The newly selected conversation, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl StoreChange {
    /// Get the event name for wire protocols.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ConversationsChanged => "inbox:conversations_changed",
            Self::ConversationChanged { .. } => "inbox:conversation_changed",
            Self::ThreadChanged { .. } => "inbox:thread_changed",
            Self::SelectionChanged { .. } => "inbox:selection_changed",
        }
    }
}
