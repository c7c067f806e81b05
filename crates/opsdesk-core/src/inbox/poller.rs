//! Polling backstop for push delivery.
//!
//! Push events can be missed across reconnects, so the store's conversation
//! set is re-fetched on a fixed interval. The tick body awaits the refresh
//! inline and missed ticks are skipped, so a slow refresh never overlaps
//! with the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::inbox::store::ConversationStore;

/// Periodic background refresh of the conversation set.
pub struct InboxPoller {
    store: Arc<ConversationStore>,
    interval: Duration,
    cancel: CancellationToken,
}

impl InboxPoller {
    /// Default refresh cadence.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    /// Create a poller bound to a store.
    ///
    /// # Arguments
    ///
    /// * `store` - Store whose `refresh` is driven on each tick
    /// * `poll_interval` - How often to refresh (e.g. 30 seconds)
    /// * `cancel` - Token that stops the poller at session teardown
    pub fn new(
        store: Arc<ConversationStore>,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            interval: poll_interval,
            cancel,
        }
    }

    /// Run until cancelled.
    ///
    /// Refresh failures are logged and the cadence continues; the next tick
    /// is the retry.
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; the store
        // was just loaded at session start, so consume it.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("inbox poller stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.store.refresh().await {
                        warn!(error = %e, "background inbox refresh failed");
                    }
                }
            }
        }
    }

    /// Spawn the poller onto the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
