//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: the API client (via opsdesk-api), the conversation
//! store (via opsdesk-core), and the notifier chosen by the command.
//! Command handlers receive the fully-composed context and delegate to it.

use std::sync::Arc;

use opsdesk_api::{ApiClientConfig, DefaultInboxClient};
use opsdesk_core::{ChangeNotifier, ConversationStore};

use crate::error::CliError;

/// Bootstrap configuration for the CLI, read from the environment.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Base URL of the backend API.
    pub base_url: String,
    /// Bearer token for the signed-in operator.
    pub token: String,
    /// Active tenant scope.
    pub business_id: String,
}

impl CliConfig {
    /// Read configuration from `OPSDESK_API_URL`, `OPSDESK_API_TOKEN`, and
    /// `OPSDESK_BUSINESS_ID`.
    pub fn from_env() -> Result<Self, CliError> {
        Ok(Self {
            base_url: require_env("OPSDESK_API_URL")?,
            token: require_env("OPSDESK_API_TOKEN")?,
            business_id: require_env("OPSDESK_BUSINESS_ID")?,
        })
    }
}

fn require_env(name: &str) -> Result<String, CliError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CliError::Config(format!("{name} is not set")))
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// The conversation store, session lifetime matches the process.
    pub store: Arc<ConversationStore>,
    /// API configuration, reused by the event feed in watch mode.
    pub api_config: ApiClientConfig,
}

/// Compose the store over the REST client.
pub fn build_context(config: &CliConfig, notifier: Arc<dyn ChangeNotifier>) -> CliContext {
    let api_config = ApiClientConfig::new(
        config.base_url.clone(),
        config.token.clone(),
        config.business_id.clone(),
    );
    let client = Arc::new(DefaultInboxClient::new(&api_config));
    let store = Arc::new(ConversationStore::new(client, notifier));
    CliContext { store, api_config }
}
