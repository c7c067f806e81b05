//! Store operation errors and bulk outcomes.

use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced by [`crate::inbox::ConversationStore`] operations.
///
/// The store never panics and never swallows a failure; every operation
/// returns one of these so callers can decide between retry affordances and
/// falling back to last-known-good state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying transport call failed. Read fetches are safe for the
    /// caller to retry; the store itself never retries.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The operation was rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The reply was not sent; the caller must preserve the draft.
    #[error("reply was not sent: {0}")]
    SendFailed(#[source] TransportError),

    /// Read confirmation failed; the prior unread count was restored.
    #[error("failed to confirm read state: {0}")]
    MarkReadFailed(#[source] TransportError),

    /// The conversation id is not in the loaded set.
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),
}

/// Per-id failure within a bulk status transition.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    /// The conversation whose transition failed.
    pub id: String,
    /// Why it failed.
    pub error: TransportError,
}

/// Result of a best-effort bulk operation.
///
/// Partial failure is data, not an error: the targeted records are
/// independent, so callers always need both lists.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    /// Ids whose transition was applied (or was already in effect).
    pub succeeded: Vec<String>,
    /// Ids whose transition failed, with the per-id error.
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    /// True when every targeted id succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// True when some ids succeeded and some failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }
}
