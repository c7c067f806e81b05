//! Core domain types, ports, and the inbox conversation store for opsdesk.
//!
//! This crate holds everything with independent logic: the conversation
//! store state machine, realtime reconciliation, bulk-operation semantics,
//! and the pure list projection. Infrastructure (HTTP transport, the push
//! feed, terminals) enters through the traits in [`ports`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod inbox;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    Channel, Contact, Conversation, ConversationStatus, Direction, Message, MessageKind,
    MessageSummary,
};
pub use events::{RealtimeEvent, StoreChange};
pub use inbox::{
    BulkAction, BulkFailure, BulkOutcome, BulkSelection, ConversationStore, InboxPoller,
    InboxSnapshot, RealtimeBridge, SelectionMode, StoreError,
};
pub use ports::{
    ChangeNotifier, ConversationFilter, InboxClientPort, NoopNotifier, TransportError,
};

// Silence unused dev-dependency warnings until we add mock-based tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
