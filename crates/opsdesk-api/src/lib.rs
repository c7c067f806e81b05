//! REST transport and realtime feed adapter for the opsdesk inbox.
//!
//! Implements the core's `InboxClientPort` against the dashboard backend
//! and provides the server-sent event feed that yields realtime inbox
//! events. Auth credential and tenant scoping live here, attached as opaque
//! headers; the core never sees them.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// Allow private types behind the public client type alias - the client is
// meant to be used through the core's InboxClientPort trait.
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod events;
mod http;
mod models;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultInboxClient;

// Configuration
pub use config::ApiClientConfig;

// Realtime feed
pub use events::EventFeed;

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
