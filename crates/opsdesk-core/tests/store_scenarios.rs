//! End-to-end store scenarios exercising overlapping async operations:
//! fetch supersession, the select/push/confirm round trip, and mixed
//! fetch-plus-push thread assembly.

mod common;

use std::sync::Arc;

use common::{conversation, inbound, FakeInboxClient};
use opsdesk_core::{
    ConversationFilter, ConversationStore, NoopNotifier, RealtimeEvent, StoreError,
};
use tokio::task::yield_now;

fn store_over(client: &Arc<FakeInboxClient>) -> Arc<ConversationStore> {
    Arc::new(ConversationStore::new(
        client.clone(),
        Arc::new(NoopNotifier::new()),
    ))
}

async fn until(mut ready: impl FnMut() -> bool) {
    while !ready() {
        yield_now().await;
    }
}

/// Two list fetches issued A then B; B's response arrives first. A's late
/// response must not overwrite the state B produced.
#[tokio::test]
async fn late_list_response_is_discarded_after_newer_one_applied() {
    let client = Arc::new(FakeInboxClient::new(vec![]));
    let store = store_over(&client);

    let gate_a = client.gate_next_list();
    let gate_b = client.gate_next_list();

    let task_a = tokio::spawn({
        let store = store.clone();
        async move { store.load_conversations(ConversationFilter::default()).await }
    });
    until(|| client.list_calls() == 1).await;

    let task_b = tokio::spawn({
        let store = store.clone();
        async move { store.load_conversations(ConversationFilter::default()).await }
    });
    until(|| client.list_calls() == 2).await;

    // B completes first with the fresh result.
    gate_b
        .send(vec![conversation("fresh", "Fresh", 0, 20)])
        .unwrap();
    task_b.await.unwrap().unwrap();
    assert_eq!(store.snapshot().conversations[0].id, "fresh");

    // A's stale response arrives afterwards and must be dropped.
    gate_a
        .send(vec![conversation("stale", "Stale", 0, 10)])
        .unwrap();
    task_a.await.unwrap().unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.conversations.len(), 1);
    assert_eq!(snapshot.conversations[0].id, "fresh");
}

/// When the slower fetch completes first, both apply in arrival order and
/// the later (newer) response wins.
#[tokio::test]
async fn newer_list_response_still_applies_after_older_one() {
    let client = Arc::new(FakeInboxClient::new(vec![]));
    let store = store_over(&client);

    let gate_a = client.gate_next_list();
    let gate_b = client.gate_next_list();

    let task_a = tokio::spawn({
        let store = store.clone();
        async move { store.load_conversations(ConversationFilter::default()).await }
    });
    until(|| client.list_calls() == 1).await;
    let task_b = tokio::spawn({
        let store = store.clone();
        async move { store.load_conversations(ConversationFilter::default()).await }
    });
    until(|| client.list_calls() == 2).await;

    gate_a
        .send(vec![conversation("older", "Older", 0, 10)])
        .unwrap();
    task_a.await.unwrap().unwrap();
    gate_b
        .send(vec![conversation("newer", "Newer", 0, 20)])
        .unwrap();
    task_b.await.unwrap().unwrap();

    assert_eq!(store.snapshot().conversations[0].id, "newer");
}

/// Round trip: select a conversation with unread messages, receive an
/// inbound push while the read confirmation is still in flight. The new
/// message lands in the visible thread without touching the unread count.
#[tokio::test]
async fn push_while_selected_appends_without_incrementing_unread() {
    let client = Arc::new(FakeInboxClient::new(vec![conversation(
        "c", "Carol", 2, 10,
    )]));
    client.set_thread(vec![inbound("m1", "c", 5), inbound("m2", "c", 8)]);
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();

    let confirm_gate = client.gate_next_mark_read();
    let select = tokio::spawn({
        let store = store.clone();
        async move { store.select_conversation("c").await }
    });
    until(|| client.mark_read_calls() == 1).await;

    // Optimistic zero is already visible while confirmation is pending.
    assert_eq!(store.snapshot().conversations[0].unread_count, 0);

    // Inbound push for the conversation on screen.
    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("m3", "c", 30),
    });

    confirm_gate.send(Ok(())).unwrap();
    select.await.unwrap().unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.conversations[0].unread_count, 0);
    let ids: Vec<_> = snapshot.thread.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2", "m3"]);
}

/// Same round trip with a failing confirmation: the prior count is restored
/// exactly, even though a message arrived in between.
#[tokio::test]
async fn failed_confirmation_restores_prior_unread_exactly() {
    let client = Arc::new(FakeInboxClient::new(vec![conversation(
        "c", "Carol", 2, 10,
    )]));
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();

    let confirm_gate = client.gate_next_mark_read();
    let select = tokio::spawn({
        let store = store.clone();
        async move { store.select_conversation("c").await }
    });
    until(|| client.mark_read_calls() == 1).await;

    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("m3", "c", 30),
    });

    confirm_gate
        .send(Err(opsdesk_core::TransportError::Status {
            status: 503,
            message: None,
        }))
        .unwrap();
    let err = select.await.unwrap().unwrap_err();
    assert!(matches!(err, StoreError::MarkReadFailed(_)));
    assert_eq!(store.snapshot().conversations[0].unread_count, 2);
}

/// Threads assemble in sent-at order regardless of whether entries arrived
/// by fetch or push, and duplicates collapse.
#[tokio::test]
async fn thread_merges_fetch_and_push_in_sent_at_order() {
    let client = Arc::new(FakeInboxClient::new(vec![conversation(
        "c", "Carol", 0, 10,
    )]));
    client.set_thread(vec![inbound("m1", "c", 10), inbound("m3", "c", 30)]);
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();
    store.select_conversation("c").await.unwrap();

    // Out-of-order push slots between the fetched messages.
    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("m2", "c", 20),
    });
    // Duplicate delivery of a fetched message collapses.
    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("m1", "c", 10),
    });

    let snapshot = store.snapshot();
    let ids: Vec<_> = snapshot
        .thread
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(ids, ["m1", "m2", "m3"]);
}

/// A thread fetch whose conversation is no longer selected is discarded.
#[tokio::test]
async fn thread_fetch_for_deselected_conversation_is_discarded() {
    let client = Arc::new(FakeInboxClient::new(vec![
        conversation("a", "Alice", 0, 10),
        conversation("b", "Bob", 0, 20),
    ]));
    client.set_thread(vec![inbound("bm", "b", 15)]);
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();
    store.select_conversation("b").await.unwrap();

    // A stray fetch for "a" completes while "b" is selected.
    store.load_messages("a").await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.selected.as_deref(), Some("b"));
    let ids: Vec<_> = snapshot.thread.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["bm"]);
}

/// A reload that no longer contains the selected conversation clears the
/// selection and thread.
#[tokio::test]
async fn reload_without_selected_conversation_clears_selection() {
    let client = Arc::new(FakeInboxClient::new(vec![conversation(
        "a", "Alice", 0, 10,
    )]));
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();
    store.select_conversation("a").await.unwrap();

    let gate = client.gate_next_list();
    let reload = tokio::spawn({
        let store = store.clone();
        async move { store.load_conversations(ConversationFilter::default()).await }
    });
    gate.send(vec![conversation("z", "Zed", 0, 40)]).unwrap();
    reload.await.unwrap().unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.selected.is_none());
    assert!(snapshot.thread.is_empty());
    assert_eq!(snapshot.conversations[0].id, "z");
}

/// Unread totals across mixed push traffic: only inbound messages for
/// unselected conversations count.
#[tokio::test]
async fn unread_accounting_across_conversations() {
    let client = Arc::new(FakeInboxClient::new(vec![
        conversation("a", "Alice", 0, 10),
        conversation("b", "Bob", 0, 20),
    ]));
    let store = store_over(&client);
    store
        .load_conversations(ConversationFilter::default())
        .await
        .unwrap();
    store.select_conversation("a").await.unwrap();

    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("a1", "a", 30),
    });
    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("b1", "b", 31),
    });
    store.apply_event(RealtimeEvent::NewMessage {
        message: inbound("b2", "b", 32),
    });

    let snapshot = store.snapshot();
    let unread_of = |id: &str| {
        snapshot
            .conversations
            .iter()
            .find(|c| c.id == id)
            .unwrap()
            .unread_count
    };
    assert_eq!(unread_of("a"), 0);
    assert_eq!(unread_of("b"), 2);
}
