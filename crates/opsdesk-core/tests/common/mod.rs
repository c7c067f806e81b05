//! Shared test doubles for store scenario tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use opsdesk_core::{
    Channel, Contact, Conversation, ConversationFilter, ConversationStatus, Direction,
    InboxClientPort, Message, MessageKind, TransportError,
};
use tokio::sync::oneshot;

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, minute, 0).unwrap()
}

pub fn conversation(id: &str, name: &str, unread: u32, minute: u32) -> Conversation {
    Conversation {
        id: id.to_string(),
        business_id: "biz_1".to_string(),
        contact: Contact {
            id: format!("ct_{id}"),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            phone: None,
            notes: None,
            source: None,
            status: None,
            tags: vec![],
        },
        channel: Channel::Sms,
        status: ConversationStatus::Open,
        last_message_at: at(minute),
        updated_at: at(minute),
        automation_paused: false,
        unread_count: unread,
        last_message: None,
    }
}

pub fn inbound(id: &str, conversation_id: &str, minute: u32) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        direction: Direction::Inbound,
        kind: MessageKind::Manual,
        content: format!("message {id}"),
        channel: Channel::Sms,
        sent_at: at(minute),
        read_at: None,
    }
}

/// Transport fake whose list and mark-read responses can be gated so tests
/// control completion order explicitly.
#[derive(Default)]
pub struct FakeInboxClient {
    conversations: Mutex<Vec<Conversation>>,
    thread: Mutex<Vec<Message>>,
    gated_lists: Mutex<VecDeque<oneshot::Receiver<Vec<Conversation>>>>,
    gated_mark_read: Mutex<Option<oneshot::Receiver<Result<(), TransportError>>>>,
    list_calls: AtomicUsize,
    mark_read_calls: AtomicUsize,
}

impl FakeInboxClient {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations: Mutex::new(conversations),
            ..Self::default()
        }
    }

    pub fn set_thread(&self, thread: Vec<Message>) {
        *self.thread.lock().unwrap() = thread;
    }

    /// Queue a gated list response; the returned sender releases it with
    /// the data to serve. Gates are consumed in request order.
    pub fn gate_next_list(&self) -> oneshot::Sender<Vec<Conversation>> {
        let (tx, rx) = oneshot::channel();
        self.gated_lists.lock().unwrap().push_back(rx);
        tx
    }

    /// Gate the next mark-read call; the returned sender releases it with
    /// the result to return.
    pub fn gate_next_mark_read(&self) -> oneshot::Sender<Result<(), TransportError>> {
        let (tx, rx) = oneshot::channel();
        *self.gated_mark_read.lock().unwrap() = Some(rx);
        tx
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mark_read_calls(&self) -> usize {
        self.mark_read_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InboxClientPort for FakeInboxClient {
    async fn list_conversations(
        &self,
        _filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gated_lists.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.map_err(|_| TransportError::Network {
                message: "gate dropped".to_string(),
            }),
            None => Ok(self.conversations.lock().unwrap().clone()),
        }
    }

    async fn thread(&self, _conversation_id: &str) -> Result<Vec<Message>, TransportError> {
        Ok(self.thread.lock().unwrap().clone())
    }

    async fn send_reply(
        &self,
        conversation_id: &str,
        content: &str,
        channel: Channel,
    ) -> Result<Message, TransportError> {
        Ok(Message {
            id: format!("reply_{conversation_id}"),
            conversation_id: conversation_id.to_string(),
            direction: Direction::Outbound,
            kind: MessageKind::Manual,
            content: content.to_string(),
            channel,
            sent_at: at(59),
            read_at: None,
        })
    }

    async fn resolve(&self, conversation_id: &str) -> Result<Conversation, TransportError> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .map(|mut c| {
                c.status = ConversationStatus::Resolved;
                c.updated_at = at(58);
                c
            })
            .ok_or(TransportError::Status {
                status: 404,
                message: None,
            })
    }

    async fn reopen(&self, conversation_id: &str) -> Result<Conversation, TransportError> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .map(|mut c| {
                c.status = ConversationStatus::Open;
                c.updated_at = at(58);
                c
            })
            .ok_or(TransportError::Status {
                status: 404,
                message: None,
            })
    }

    async fn set_automation_paused(
        &self,
        conversation_id: &str,
        paused: bool,
    ) -> Result<Conversation, TransportError> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .map(|mut c| {
                c.automation_paused = paused;
                c.updated_at = at(58);
                c
            })
            .ok_or(TransportError::Status {
                status: 404,
                message: None,
            })
    }

    async fn mark_read(&self, _conversation_id: &str) -> Result<(), TransportError> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gated_mark_read.lock().unwrap().take();
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(TransportError::Network {
                message: "gate dropped".to_string(),
            })),
            None => Ok(()),
        }
    }
}
