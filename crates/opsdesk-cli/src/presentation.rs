//! Terminal formatting for conversations and threads.

use chrono::{DateTime, Utc};
use opsdesk_core::{Conversation, Message};

/// One conversation as a list row.
#[must_use]
pub fn conversation_row(conversation: &Conversation) -> String {
    let mut row = format!(
        "{:<12} {:<8} {:<5} {:<20} {}",
        conversation.id,
        conversation.status,
        conversation.channel,
        snippet(&conversation.contact.name, 20),
        timestamp(conversation.last_message_at),
    );
    if let Some(last) = &conversation.last_message {
        row.push_str("  ");
        row.push_str(&snippet(&last.content, 48));
    }
    if conversation.unread_count > 0 {
        row.push_str(&format!(" ({} unread)", conversation.unread_count));
    }
    if conversation.automation_paused {
        row.push_str(" [automation paused]");
    }
    row
}

/// One message as a thread line.
#[must_use]
pub fn message_line(message: &Message) -> String {
    let arrow = match message.direction {
        opsdesk_core::Direction::Inbound => "<-",
        opsdesk_core::Direction::Outbound => "->",
    };
    format!(
        "{} {} [{}] {}",
        timestamp(message.sent_at),
        arrow,
        message.kind.as_str(),
        message.content,
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate to `max` characters with an ellipsis.
fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
