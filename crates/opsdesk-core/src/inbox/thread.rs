//! Ordered, deduplicated message thread maintenance.
//!
//! Threads are ordered by `(sent_at, id)` regardless of arrival order, and
//! the same message id never appears twice. Push delivery is at-least-once
//! and unordered, so both properties have to be enforced on insertion rather
//! than assumed from the transport.

use std::collections::HashSet;

use crate::domain::Message;

/// Insert a message at its ordered position.
///
/// Returns `false` without modifying the thread when the id is already
/// present. Ties on `sent_at` are broken by id for determinism.
pub(crate) fn insert_ordered(thread: &mut Vec<Message>, message: Message) -> bool {
    if thread.iter().any(|m| m.id == message.id) {
        return false;
    }
    let idx = thread.partition_point(|m| {
        (m.sent_at, m.id.as_str()) <= (message.sent_at, message.id.as_str())
    });
    thread.insert(idx, message);
    true
}

/// Sort a fetched thread by `(sent_at, id)` and drop duplicate ids.
///
/// The first occurrence of an id wins; the backend does not mutate message
/// content, so duplicates are interchangeable.
pub(crate) fn normalize(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| (a.sent_at, a.id.as_str()).cmp(&(b.sent_at, b.id.as_str())));
    let mut seen = HashSet::with_capacity(messages.len());
    messages.retain(|m| seen.insert(m.id.clone()));
    messages
}
