//! Bridge from the realtime push channel into the store.
//!
//! The feed adapter produces [`RealtimeEvent`]s on an mpsc channel; this
//! bridge drains them into [`ConversationStore::apply_event`] until the
//! channel closes or the session is torn down. Holding the subscription in
//! a scoped task keeps listeners from leaking across store instances.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::RealtimeEvent;
use crate::inbox::store::ConversationStore;

/// Drains push events into the store.
pub struct RealtimeBridge {
    store: Arc<ConversationStore>,
    cancel: CancellationToken,
}

impl RealtimeBridge {
    /// Create a bridge bound to a store.
    pub fn new(store: Arc<ConversationStore>, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// Run until the channel closes or the token is cancelled.
    pub async fn run(self, mut events: mpsc::Receiver<RealtimeEvent>) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("realtime bridge stopped");
                    return;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.store.apply_event(event),
                        None => {
                            debug!("realtime channel closed");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Spawn the bridge onto the current runtime.
    pub fn spawn(self, events: mpsc::Receiver<RealtimeEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
