//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (HTTP transport, push delivery, etc.).
//!
//! # Structure
//!
//! - `contact` - Contact identity embedded in conversations
//! - `conversation` - Conversation metadata and status types
//! - `message` - Message and message-summary types

pub mod contact;
pub mod conversation;
pub mod message;

// Re-export domain types at the domain level for convenience
pub use contact::Contact;
pub use conversation::{Channel, Conversation, ConversationStatus};
pub use message::{Direction, Message, MessageKind, MessageSummary};
