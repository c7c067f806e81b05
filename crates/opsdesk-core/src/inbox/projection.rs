//! List projection: filter, search, and sort over store state.
//!
//! Pure data transformation - no async behavior, cannot fail. The visible
//! list is always derived fresh from the conversation set and the active
//! filter; the projection owns no state.

use crate::domain::Conversation;
use crate::ports::ConversationFilter;

/// Project the visible, ordered conversation list.
///
/// Filtering is a predicate intersection: the status tab AND a
/// case-insensitive substring match against the contact name or the cached
/// last-message content. Sorted by `last_message_at` descending; the sort is
/// stable, so ties keep their stored order.
#[must_use]
pub fn visible<'a>(
    conversations: &'a [Conversation],
    filter: &ConversationFilter,
) -> Vec<&'a Conversation> {
    let needle = filter
        .search
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty());

    let mut out: Vec<&Conversation> = conversations
        .iter()
        .filter(|c| filter.status.is_none_or(|status| c.status == status))
        .filter(|c| needle.as_deref().is_none_or(|n| matches_search(c, n)))
        .collect();

    out.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    out
}

fn matches_search(conversation: &Conversation, needle_lower: &str) -> bool {
    if conversation
        .contact
        .name
        .to_lowercase()
        .contains(needle_lower)
    {
        return true;
    }
    conversation
        .last_message
        .as_ref()
        .is_some_and(|m| m.content.to_lowercase().contains(needle_lower))
}
