//! The conversation store - single source of truth for inbox state.
//!
//! Holds the conversation set visible to the signed-in operator's active
//! tenant and the loaded thread of at most one selected conversation, and
//! reconciles explicit fetches, push events, and operator mutations.
//!
//! # Concurrency
//!
//! All state lives behind a `std::sync::Mutex` that is never held across an
//! await; overlap comes only from concurrent async operations sharing the
//! `Arc<ConversationStore>`. Fetch results are applied under a supersession
//! ticket so a slow stale response can never overwrite a newer one, and push
//! updates are discarded while a local mutation for the same record is in
//! flight or when their server stamp is older than the last applied one.
//!
//! The store is constructed per session and dropped at teardown; tests get
//! isolation by constructing a fresh store per case.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    Channel, Conversation, ConversationStatus, Direction, Message, MessageSummary,
};
use crate::events::{RealtimeEvent, StoreChange};
use crate::inbox::errors::{BulkFailure, BulkOutcome, StoreError};
use crate::inbox::thread;
use crate::ports::{ChangeNotifier, ConversationFilter, InboxClientPort};

/// Read-only copy of the store's current state, for views and tests.
#[derive(Debug, Clone, Default)]
pub struct InboxSnapshot {
    /// The loaded conversation set.
    pub conversations: Vec<Conversation>,
    /// Id of the selected conversation, if any.
    pub selected: Option<String>,
    /// Thread of the selected conversation, ordered by `(sent_at, id)`.
    pub thread: Vec<Message>,
}

#[derive(Default)]
struct StoreState {
    conversations: Vec<Conversation>,
    selected: Option<String>,
    thread: Vec<Message>,
    filter: ConversationFilter,
    /// Supersession tickets: a list/thread response applies only when its
    /// ticket is newer than the last applied one for that scope.
    list_issued: u64,
    list_applied: u64,
    thread_issued: u64,
    thread_applied: u64,
    /// Server stamp of the last locally applied mutation, per conversation.
    local_stamp: HashMap<String, DateTime<Utc>>,
    /// Conversations with a mutation currently in flight.
    in_flight: HashMap<String, u32>,
}

/// Single source of truth for the inbox.
///
/// Views only read snapshots and issue operation calls; the store is the
/// sole mutator of conversation and message state.
pub struct ConversationStore {
    client: Arc<dyn InboxClientPort>,
    notifier: Arc<dyn ChangeNotifier>,
    state: Mutex<StoreState>,
}

impl ConversationStore {
    /// Create a store bound to a transport client and a change notifier.
    pub fn new(client: Arc<dyn InboxClientPort>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            client,
            notifier,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy out the current state.
    pub fn snapshot(&self) -> InboxSnapshot {
        let s = self.state();
        InboxSnapshot {
            conversations: s.conversations.clone(),
            selected: s.selected.clone(),
            thread: s.thread.clone(),
        }
    }

    /// The filter used by the most recent [`Self::load_conversations`] call.
    pub fn active_filter(&self) -> ConversationFilter {
        self.state().filter.clone()
    }

    /// Replace the conversation set from a backend fetch.
    ///
    /// The selected conversation's identity is preserved when it is still
    /// present in the result; otherwise selection and thread are cleared.
    /// A response is applied only if no newer request has completed since it
    /// was issued - a slow stale response is discarded silently.
    pub async fn load_conversations(&self, filter: ConversationFilter) -> Result<(), StoreError> {
        let ticket = {
            let mut s = self.state();
            s.filter = filter.clone();
            s.list_issued += 1;
            s.list_issued
        };

        let conversations = self.client.list_conversations(&filter).await?;

        let selection_cleared = {
            let mut s = self.state();
            if ticket <= s.list_applied {
                debug!(ticket, applied = s.list_applied, "discarding superseded conversation fetch");
                return Ok(());
            }
            s.list_applied = ticket;

            let mut cleared = false;
            if let Some(selected) = s.selected.clone() {
                if !conversations.iter().any(|c| c.id == selected) {
                    s.selected = None;
                    s.thread.clear();
                    cleared = true;
                }
            }
            s.conversations = conversations;
            cleared
        };

        self.notifier.notify(StoreChange::ConversationsChanged);
        if selection_cleared {
            self.notifier.notify(StoreChange::SelectionChanged { id: None });
        }
        Ok(())
    }

    /// Re-fetch with the last-used filter. Used by the polling backstop.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let filter = self.active_filter();
        self.load_conversations(filter).await
    }

    /// Make a conversation active: load its thread and mark it read.
    ///
    /// The unread count is zeroed optimistically (the thread is about to be
    /// shown) and confirmed with the backend afterwards. If either the
    /// thread load or the confirmation fails, the prior count is restored
    /// exactly and a recoverable error is returned; selection itself is
    /// retained so the caller can retry without disruption.
    pub async fn select_conversation(&self, id: &str) -> Result<(), StoreError> {
        let prior_unread = {
            let mut s = self.state();
            let conv = s
                .conversations
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::UnknownConversation(id.to_string()))?;
            let prior = conv.unread_count;
            conv.unread_count = 0;
            s.selected = Some(id.to_string());
            s.thread.clear();
            prior
        };
        self.notifier.notify(StoreChange::SelectionChanged {
            id: Some(id.to_string()),
        });
        self.notifier.notify(StoreChange::ConversationChanged { id: id.to_string() });

        self.begin_mutation(id);
        let result = self.confirm_selection(id, prior_unread).await;
        self.end_mutation(id);
        result
    }

    async fn confirm_selection(&self, id: &str, prior_unread: u32) -> Result<(), StoreError> {
        if let Err(e) = self.load_messages(id).await {
            self.restore_unread(id, prior_unread);
            return Err(e);
        }

        match self.client.mark_read(id).await {
            Ok(()) => {
                let mut s = self.state();
                let stamp = s
                    .conversations
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.updated_at);
                if let Some(stamp) = stamp {
                    s.local_stamp.insert(id.to_string(), stamp);
                }
                Ok(())
            }
            Err(e) => {
                self.restore_unread(id, prior_unread);
                Err(StoreError::MarkReadFailed(e))
            }
        }
    }

    fn restore_unread(&self, id: &str, prior: u32) {
        {
            let mut s = self.state();
            if let Some(conv) = s.conversations.iter_mut().find(|c| c.id == id) {
                conv.unread_count = prior;
            }
        }
        self.notifier.notify(StoreChange::ConversationChanged { id: id.to_string() });
    }

    /// Fetch the thread for a conversation.
    ///
    /// A result for a conversation that is no longer selected, or one
    /// superseded by a newer thread fetch, is discarded silently.
    pub async fn load_messages(&self, conversation_id: &str) -> Result<(), StoreError> {
        let ticket = {
            let mut s = self.state();
            s.thread_issued += 1;
            s.thread_issued
        };

        let messages = self.client.thread(conversation_id).await?;

        {
            let mut s = self.state();
            if s.selected.as_deref() != Some(conversation_id) {
                debug!(conversation_id, "discarding thread fetch for deselected conversation");
                return Ok(());
            }
            if ticket <= s.thread_applied {
                debug!(ticket, applied = s.thread_applied, "discarding superseded thread fetch");
                return Ok(());
            }
            s.thread_applied = ticket;
            s.thread = thread::normalize(messages);

            // Reconcile the cached summary with the freshly loaded thread.
            let newest = s.thread.last().map(|m| (MessageSummary::of(m), m.sent_at));
            if let Some((summary, sent_at)) = newest {
                if let Some(conv) = s.conversations.iter_mut().find(|c| c.id == conversation_id) {
                    if sent_at >= conv.last_message_at {
                        conv.last_message_at = sent_at;
                        conv.last_message = Some(summary);
                    }
                }
            }
        }

        self.notifier.notify(StoreChange::ThreadChanged {
            conversation_id: conversation_id.to_string(),
        });
        Ok(())
    }

    /// Send an operator reply.
    ///
    /// No optimistic insertion: the thread only ever shows confirmed server
    /// state, so a retry after failure cannot produce duplicate ids. On
    /// failure the caller keeps the draft and may retry explicitly.
    pub async fn send_reply(
        &self,
        conversation_id: &str,
        content: &str,
        channel: Channel,
    ) -> Result<Message, StoreError> {
        if content.trim().is_empty() {
            return Err(StoreError::Validation(
                "reply content must not be empty".to_string(),
            ));
        }
        {
            let s = self.state();
            let conv = s
                .conversations
                .iter()
                .find(|c| c.id == conversation_id)
                .ok_or_else(|| StoreError::UnknownConversation(conversation_id.to_string()))?;
            if conv.channel != channel {
                return Err(StoreError::Validation(format!(
                    "conversation uses channel {}, not {}",
                    conv.channel, channel
                )));
            }
        }

        self.begin_mutation(conversation_id);
        let result = self
            .client
            .send_reply(conversation_id, content, channel)
            .await;
        self.end_mutation(conversation_id);

        let message = match result {
            Ok(message) => message,
            Err(e) => return Err(StoreError::SendFailed(e)),
        };

        let appended = {
            let mut s = self.state();
            let appended = if s.selected.as_deref() == Some(conversation_id) {
                thread::insert_ordered(&mut s.thread, message.clone())
            } else {
                false
            };
            let sent_at = message.sent_at;
            s.local_stamp.insert(conversation_id.to_string(), sent_at);
            if let Some(conv) = s.conversations.iter_mut().find(|c| c.id == conversation_id) {
                if sent_at >= conv.last_message_at {
                    conv.last_message_at = sent_at;
                    conv.last_message = Some(MessageSummary::of(&message));
                }
            }
            appended
        };

        if appended {
            self.notifier.notify(StoreChange::ThreadChanged {
                conversation_id: conversation_id.to_string(),
            });
        }
        self.notifier.notify(StoreChange::ConversationChanged {
            id: conversation_id.to_string(),
        });
        Ok(message)
    }

    /// Bulk status transition, best-effort with partial success.
    ///
    /// The targeted records are independent backend rows, so one failure
    /// never rolls back the others. Ids already in the target status are
    /// reported as successes without a request (idempotent no-op).
    pub async fn set_status(&self, ids: &[String], target: ConversationStatus) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for id in ids {
            let current = {
                let s = self.state();
                s.conversations
                    .iter()
                    .find(|c| c.id == *id)
                    .map(|c| c.status)
            };
            if current == Some(target) {
                outcome.succeeded.push(id.clone());
                continue;
            }

            self.begin_mutation(id);
            let result = match target {
                ConversationStatus::Resolved => self.client.resolve(id).await,
                ConversationStatus::Open => self.client.reopen(id).await,
            };
            match result {
                Ok(updated) => {
                    self.apply_mutated(updated);
                    outcome.succeeded.push(id.clone());
                }
                Err(error) => {
                    debug!(id = %id, error = %error, "bulk status transition failed");
                    outcome.failed.push(BulkFailure {
                        id: id.clone(),
                        error,
                    });
                }
            }
            self.end_mutation(id);
        }

        if !outcome.succeeded.is_empty() {
            self.notifier.notify(StoreChange::ConversationsChanged);
        }
        outcome
    }

    /// Pause or resume backend automation for one conversation.
    pub async fn set_automation_paused(
        &self,
        conversation_id: &str,
        paused: bool,
    ) -> Result<(), StoreError> {
        self.begin_mutation(conversation_id);
        let result = self.client.set_automation_paused(conversation_id, paused).await;
        self.end_mutation(conversation_id);

        let updated = result?;
        self.apply_mutated(updated);
        self.notifier.notify(StoreChange::ConversationChanged {
            id: conversation_id.to_string(),
        });
        Ok(())
    }

    /// Apply a push event from the realtime channel.
    ///
    /// Tolerates duplicate and out-of-order delivery; events for
    /// conversations outside the loaded set are ignored.
    pub fn apply_event(&self, event: RealtimeEvent) {
        match event {
            RealtimeEvent::NewMessage { message } => self.on_new_message(message),
            RealtimeEvent::ConversationUpdate { conversation } => {
                self.on_conversation_update(conversation);
            }
        }
    }

    fn on_new_message(&self, message: Message) {
        let (applied_to_thread, conversation_id) = {
            let mut s = self.state();
            let Some(pos) = s
                .conversations
                .iter()
                .position(|c| c.id == message.conversation_id)
            else {
                debug!(conversation_id = %message.conversation_id, "ignoring message for unloaded conversation");
                return;
            };

            let selected = s.selected.as_deref() == Some(message.conversation_id.as_str());
            let mut appended = false;
            if selected {
                appended = thread::insert_ordered(&mut s.thread, message.clone());
                if !appended {
                    debug!(message_id = %message.id, "collapsed duplicate message delivery");
                    return;
                }
            } else if s.conversations[pos]
                .last_message
                .as_ref()
                .is_some_and(|m| m.id == message.id)
            {
                debug!(message_id = %message.id, "collapsed duplicate message delivery");
                return;
            }

            let conv = &mut s.conversations[pos];
            // Messages arriving for the conversation on screen are being
            // read as they appear; only unselected conversations accrue
            // unread.
            if message.direction == Direction::Inbound && !selected {
                conv.unread_count += 1;
            }
            if message.sent_at >= conv.last_message_at {
                conv.last_message_at = message.sent_at;
                conv.last_message = Some(MessageSummary::of(&message));
            }
            (appended, message.conversation_id.clone())
        };

        if applied_to_thread {
            self.notifier.notify(StoreChange::ThreadChanged {
                conversation_id: conversation_id.clone(),
            });
        }
        self.notifier.notify(StoreChange::ConversationChanged {
            id: conversation_id,
        });
    }

    fn on_conversation_update(&self, conversation: Conversation) {
        let id = conversation.id.clone();
        {
            let mut s = self.state();
            let Some(pos) = s.conversations.iter().position(|c| c.id == id) else {
                debug!(id = %id, "ignoring update for unloaded conversation");
                return;
            };
            if s.in_flight.get(&id).copied().unwrap_or(0) > 0 {
                debug!(id = %id, "discarding push update while local mutation in flight");
                return;
            }
            if let Some(stamp) = s.local_stamp.get(&id) {
                if conversation.updated_at <= *stamp {
                    debug!(id = %id, "discarding push update older than local mutation");
                    return;
                }
            }
            // Server is authoritative for metadata; the thread is never
            // touched from this event.
            s.conversations[pos] = conversation;
        }
        self.notifier.notify(StoreChange::ConversationChanged { id });
    }

    /// Replace a conversation's metadata from a mutation response and stamp
    /// the local mutation clock.
    fn apply_mutated(&self, updated: Conversation) {
        let mut s = self.state();
        s.local_stamp.insert(updated.id.clone(), updated.updated_at);
        if let Some(pos) = s.conversations.iter().position(|c| c.id == updated.id) {
            s.conversations[pos] = updated;
        }
    }

    fn begin_mutation(&self, id: &str) {
        let mut s = self.state();
        *s.in_flight.entry(id.to_string()).or_insert(0) += 1;
    }

    fn end_mutation(&self, id: &str) {
        let mut s = self.state();
        if let Some(count) = s.in_flight.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                s.in_flight.remove(id);
            }
        }
    }
}
