//! Inbox API client implementing the core `InboxClientPort` trait.
//!
//! Builds tenant-scoped endpoint URLs, delegates the HTTP mechanics to an
//! [`HttpBackend`], and maps internal errors to the core port's
//! `TransportError` at the boundary.

use async_trait::async_trait;
use url::Url;

use opsdesk_core::ports::inbox_client::{ConversationFilter, InboxClientPort, TransportError};
use opsdesk_core::{Channel, Conversation, Message};

use crate::config::ApiClientConfig;
use crate::error::ApiError;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::ReplyRequest;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `ApiError` to the core `TransportError`.
fn map_error(err: ApiError) -> TransportError {
    match err {
        ApiError::RequestFailed {
            status, message, ..
        } => TransportError::Status { status, message },
        ApiError::InvalidResponse { message } => TransportError::InvalidResponse { message },
        ApiError::Network(e) => TransportError::Network {
            message: e.to_string(),
        },
        ApiError::InvalidUrl(e) => TransportError::InvalidResponse {
            message: format!("invalid URL: {e}"),
        },
        ApiError::JsonParse(e) => TransportError::InvalidResponse {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Client
// ============================================================================

/// Inbox API client, generic over the HTTP backend for testability.
pub struct InboxApiClient<B: HttpBackend> {
    backend: B,
    base_url: String,
}

/// The production client type.
pub type DefaultInboxClient = InboxApiClient<ReqwestBackend>;

impl DefaultInboxClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &ApiClientConfig) -> Self {
        Self::with_backend(ReqwestBackend::new(config), config.base_url.clone())
    }
}

impl<B: HttpBackend> InboxApiClient<B> {
    pub(crate) fn with_backend(backend: B, base_url: String) -> Self {
        Self { backend, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn conversations_url(&self, filter: &ConversationFilter) -> Result<Url, ApiError> {
        let mut url = self.endpoint("/inbox/conversations")?;
        let search = filter.search.as_deref().filter(|s| !s.is_empty());
        if filter.status.is_some() || search.is_some() {
            let mut pairs = url.query_pairs_mut();
            if let Some(status) = filter.status {
                pairs.append_pair("status", status.as_str());
            }
            if let Some(search) = search {
                pairs.append_pair("search", search);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl<B: HttpBackend> InboxClientPort for InboxApiClient<B> {
    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, TransportError> {
        let url = self.conversations_url(filter).map_err(map_error)?;
        self.backend.get(&url).await.map_err(map_error)
    }

    async fn thread(&self, conversation_id: &str) -> Result<Vec<Message>, TransportError> {
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/messages"))
            .map_err(map_error)?;
        self.backend.get(&url).await.map_err(map_error)
    }

    async fn send_reply(
        &self,
        conversation_id: &str,
        content: &str,
        channel: Channel,
    ) -> Result<Message, TransportError> {
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/reply"))
            .map_err(map_error)?;
        let body = ReplyRequest {
            content,
            channel: channel.as_str(),
        };
        self.backend.post(&url, &body).await.map_err(map_error)
    }

    async fn resolve(&self, conversation_id: &str) -> Result<Conversation, TransportError> {
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/resolve"))
            .map_err(map_error)?;
        self.backend.patch(&url).await.map_err(map_error)
    }

    async fn reopen(&self, conversation_id: &str) -> Result<Conversation, TransportError> {
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/reopen"))
            .map_err(map_error)?;
        self.backend.patch(&url).await.map_err(map_error)
    }

    async fn set_automation_paused(
        &self,
        conversation_id: &str,
        paused: bool,
    ) -> Result<Conversation, TransportError> {
        let action = if paused {
            "pause-automation"
        } else {
            "resume-automation"
        };
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/{action}"))
            .map_err(map_error)?;
        self.backend.patch(&url).await.map_err(map_error)
    }

    async fn mark_read(&self, conversation_id: &str) -> Result<(), TransportError> {
        let url = self
            .endpoint(&format!("/inbox/conversations/{conversation_id}/read"))
            .map_err(map_error)?;
        self.backend.patch_ack(&url).await.map_err(map_error)
    }
}
