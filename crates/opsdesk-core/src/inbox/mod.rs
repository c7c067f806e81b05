//! The inbox core: store, projection, selection, and background tasks.
//!
//! # Structure
//!
//! - `store` - The conversation store state machine
//! - `thread` - Ordered, deduplicated thread maintenance
//! - `projection` - Pure filter/search/sort over store state
//! - `selection` - Bulk selection state machine
//! - `poller` - Polling backstop with overlap protection
//! - `realtime` - Bridge from the push channel into the store
//! - `errors` - Store errors and bulk outcomes

pub mod errors;
pub mod poller;
pub mod projection;
pub mod realtime;
pub mod selection;
pub mod store;
mod thread;

pub use errors::{BulkFailure, BulkOutcome, StoreError};
pub use poller::InboxPoller;
pub use realtime::RealtimeBridge;
pub use selection::{BulkAction, BulkSelection, SelectionMode};
pub use store::{ConversationStore, InboxSnapshot};
