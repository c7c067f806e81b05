//! Subcommand definitions and handlers.
//!
//! Handlers delegate all semantics to the conversation store; this module
//! only parses arguments, wires the watch-mode tasks, and prints.

use clap::Subcommand;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use opsdesk_api::EventFeed;
use opsdesk_core::inbox::projection;
use opsdesk_core::{
    ChangeNotifier, ConversationFilter, ConversationStatus, InboxPoller, RealtimeBridge,
    StoreChange,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation;

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List conversations
    List {
        /// Restrict to a status tab: open or resolved
        #[arg(long)]
        status: Option<String>,
        /// Case-insensitive text search on contact name and last message
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a conversation thread and mark it read
    Show {
        /// Conversation id
        id: String,
    },

    /// Send a reply on the conversation's channel
    Reply {
        /// Conversation id
        id: String,
        /// Reply text
        message: String,
    },

    /// Resolve one or more conversations
    Resolve {
        /// Conversation ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Reopen one or more conversations
    Reopen {
        /// Conversation ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Pause automated replies for a conversation
    Pause {
        /// Conversation id
        id: String,
    },

    /// Resume automated replies for a conversation
    Resume {
        /// Conversation id
        id: String,
    },

    /// Stream live inbox activity until interrupted
    Watch,
}

/// Route a parsed command to its handler.
pub async fn dispatch(context: &CliContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List { status, search } => list(context, status, search).await,
        Commands::Show { id } => show(context, &id).await,
        Commands::Reply { id, message } => reply(context, &id, &message).await,
        Commands::Resolve { ids } => bulk(context, &ids, ConversationStatus::Resolved).await,
        Commands::Reopen { ids } => bulk(context, &ids, ConversationStatus::Open).await,
        Commands::Pause { id } => automation(context, &id, true).await,
        Commands::Resume { id } => automation(context, &id, false).await,
        Commands::Watch => watch(context).await,
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<ConversationStatus>, CliError> {
    raw.map(|s| {
        ConversationStatus::parse(s)
            .ok_or_else(|| CliError::Arguments(format!("unknown status: {s} (open|resolved)")))
    })
    .transpose()
}

async fn list(
    context: &CliContext,
    status: Option<String>,
    search: Option<String>,
) -> Result<(), CliError> {
    let filter = ConversationFilter {
        status: parse_status(status.as_deref())?,
        search,
    };
    context.store.load_conversations(filter.clone()).await?;

    let snapshot = context.store.snapshot();
    let rows = projection::visible(&snapshot.conversations, &filter);
    if rows.is_empty() {
        println!("no conversations");
        return Ok(());
    }
    for conversation in rows {
        println!("{}", presentation::conversation_row(conversation));
    }
    Ok(())
}

async fn show(context: &CliContext, id: &str) -> Result<(), CliError> {
    context
        .store
        .load_conversations(ConversationFilter::default())
        .await?;
    context.store.select_conversation(id).await?;

    let snapshot = context.store.snapshot();
    if let Some(conversation) = snapshot.conversations.iter().find(|c| c.id == id) {
        println!(
            "{} <{}> via {} - {}",
            conversation.contact.name,
            conversation.contact.email,
            conversation.channel,
            conversation.status,
        );
    }
    for message in &snapshot.thread {
        println!("{}", presentation::message_line(message));
    }
    Ok(())
}

async fn reply(context: &CliContext, id: &str, message: &str) -> Result<(), CliError> {
    context
        .store
        .load_conversations(ConversationFilter::default())
        .await?;
    // Replies go out on the conversation's own channel.
    let channel = context
        .store
        .snapshot()
        .conversations
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.channel)
        .ok_or_else(|| CliError::Arguments(format!("unknown conversation: {id}")))?;

    let sent = context.store.send_reply(id, message, channel).await?;
    println!("sent {} at {}", sent.id, sent.sent_at.format("%H:%M:%S"));
    Ok(())
}

async fn bulk(
    context: &CliContext,
    ids: &[String],
    target: ConversationStatus,
) -> Result<(), CliError> {
    context
        .store
        .load_conversations(ConversationFilter::default())
        .await?;
    let outcome = context.store.set_status(ids, target).await;
    debug!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "bulk status transition finished"
    );

    for id in &outcome.succeeded {
        println!("{id}: {target}");
    }
    for failure in &outcome.failed {
        eprintln!("{}: failed: {}", failure.id, failure.error);
    }
    if outcome.succeeded.is_empty() && !outcome.failed.is_empty() {
        return Err(CliError::Backend(
            "no conversations were updated".to_string(),
        ));
    }
    Ok(())
}

async fn automation(context: &CliContext, id: &str, paused: bool) -> Result<(), CliError> {
    context
        .store
        .load_conversations(ConversationFilter::default())
        .await?;
    context.store.set_automation_paused(id, paused).await?;
    println!(
        "{id}: automation {}",
        if paused { "paused" } else { "resumed" }
    );
    Ok(())
}

async fn watch(context: &CliContext) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(256);

    let feed = EventFeed::new(context.api_config.clone(), cancel.clone()).spawn(tx);
    let bridge = RealtimeBridge::new(context.store.clone(), cancel.clone()).spawn(rx);
    let poller = InboxPoller::new(
        context.store.clone(),
        InboxPoller::DEFAULT_INTERVAL,
        cancel.clone(),
    )
    .spawn();

    context
        .store
        .load_conversations(ConversationFilter::default())
        .await?;
    println!("watching inbox (ctrl-c to stop)");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Store(e.to_string()))?;
    cancel.cancel();
    let _ = tokio::join!(feed, bridge, poller);
    Ok(())
}

/// Prints store change notifications as they arrive (watch mode).
#[derive(Debug, Clone, Default)]
pub struct PrintNotifier;

impl ChangeNotifier for PrintNotifier {
    fn notify(&self, change: StoreChange) {
        match change {
            StoreChange::ConversationsChanged => println!("* conversation list updated"),
            StoreChange::ConversationChanged { id } => println!("* conversation {id} changed"),
            StoreChange::ThreadChanged { conversation_id } => {
                println!("* new activity in {conversation_id}");
            }
            StoreChange::SelectionChanged { .. } => {}
        }
    }

    fn clone_box(&self) -> Box<dyn ChangeNotifier> {
        Box::new(self.clone())
    }
}
