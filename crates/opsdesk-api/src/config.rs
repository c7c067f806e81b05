//! Public configuration for the inbox API client.
//!
//! Every request the client issues carries the bearer token and the tenant
//! scoping header from this config; the core never sees either.

use std::time::Duration;

/// Configuration for the inbox API client and event feed.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use opsdesk_api::ApiClientConfig;
/// use std::time::Duration;
///
/// let config = ApiClientConfig::new("https://api.opsdesk.test", "token", "biz_42")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the backend API
    pub(crate) base_url: String,
    /// Bearer token attached to every request
    pub(crate) token: String,
    /// Tenant scope attached to every request
    pub(crate) business_id: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient read failures
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    /// Delay before reconnecting a dropped event feed
    pub(crate) reconnect_delay: Duration,
}

impl ApiClientConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        business_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            business_id: business_id.into(),
            user_agent: concat!("opsdesk-api/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            reconnect_delay: Duration::from_secs(5),
        }
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient read
    /// failures. Mutations are never retried.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the delay before reconnecting a dropped event feed.
    ///
    /// Defaults to 5 seconds.
    #[must_use]
    pub const fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
