//! HTTP backend abstraction for the inbox API.
//!
//! This module provides a trait-based HTTP backend that allows for
//! dependency injection and easy testing. The production implementation
//! uses reqwest; reads retry transient errors, mutations never do (no
//! idempotency key in this protocol).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{unwrap_ack, unwrap_envelope, Envelope};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that speak the backend's response envelope.
///
/// This is an implementation detail - external code should use the client
/// through the core's `InboxClientPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET an envelope-wrapped payload, retrying transient failures.
    async fn get<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T>;

    /// POST a JSON body, single attempt.
    async fn post<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> ApiResult<T>;

    /// PATCH with an empty body, single attempt.
    async fn patch<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T>;

    /// PATCH with an empty body where the response carries no payload.
    async fn patch_ack(&self, url: &Url) -> ApiResult<()>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
///
/// Attaches the bearer token and tenant header to every request and
/// implements exponential backoff for transient GET failures (5xx and
/// network errors).
pub struct ReqwestBackend {
    client: reqwest::Client,
    token: String,
    business_id: String,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &ApiClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            token: config.token.clone(),
            business_id: config.business_id.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        }
    }

    /// Attach auth and tenant scoping.
    fn scope(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-Business-Id", &self.business_id)
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status().as_u16();
        let envelope: Envelope<T> = response.json().await?;
        unwrap_envelope(status, url, envelope)
    }

    /// Single-attempt send; non-2xx statuses become `RequestFailed`.
    async fn send_once(&self, request: reqwest::RequestBuilder, url: &Url) -> ApiResult<reqwest::Response> {
        let response = self.scope(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // The body may still carry an envelope with a server message.
        let message = response
            .json::<Envelope<serde_json::Value>>()
            .await
            .ok()
            .and_then(|e| e.error);
        Err(ApiError::RequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }

    /// GET with automatic retry for transient errors.
    async fn get_with_retry(&self, url: &Url) -> ApiResult<reqwest::Response> {
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                tokio::time::sleep(delay).await;
            }

            match self.scope(self.client.get(url.as_str())).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(ApiError::RequestFailed {
                            status: status.as_u16(),
                            url: url.to_string(),
                            message: None,
                        });
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    let message = response
                        .json::<Envelope<serde_json::Value>>()
                        .await
                        .ok()
                        .and_then(|e| e.error);
                    return Err(ApiError::RequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                        message,
                    });
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt < self.max_retries {
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::InvalidResponse {
            message: "unknown error during fetch".to_string(),
        }))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
        let response = self.get_with_retry(url).await?;
        Self::decode(url, response).await
    }

    async fn post<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.post(url.as_str()).json(body);
        let response = self.send_once(request, url).await?;
        Self::decode(url, response).await
    }

    async fn patch<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
        let request = self.client.patch(url.as_str());
        let response = self.send_once(request, url).await?;
        Self::decode(url, response).await
    }

    async fn patch_ack(&self, url: &Url) -> ApiResult<()> {
        let request = self.client.patch(url.as_str());
        let response = self.send_once(request, url).await?;
        let status = response.status().as_u16();
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        unwrap_ack(status, url, envelope)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A fake HTTP backend that returns canned envelope payloads keyed by
    /// URL substring, recording every request it serves.
    pub struct FakeBackend {
        responses: Arc<Mutex<HashMap<String, serde_json::Value>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        /// Create a new fake backend.
        pub fn new() -> Self {
            Self {
                responses: Arc::new(Mutex::new(HashMap::new())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Add a canned payload for a URL pattern.
        pub fn with_response(self, url_contains: &str, payload: serde_json::Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url_contains.to_string(), payload);
            self
        }

        /// The method-and-URL log of every served request.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn serve<T: DeserializeOwned>(&self, method: &str, url: &Url) -> ApiResult<T> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("{method} {url}"));
            let payload = {
                let responses = self.responses.lock().unwrap();
                responses
                    .iter()
                    .find(|(pattern, _)| url.as_str().contains(pattern.as_str()))
                    .map(|(_, payload)| payload.clone())
            };
            let payload = payload.ok_or_else(|| ApiError::RequestFailed {
                status: 404,
                url: url.to_string(),
                message: None,
            })?;
            serde_json::from_value(payload).map_err(Into::into)
        }
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
            self.serve("GET", url)
        }

        async fn post<T: DeserializeOwned + Send, B: Serialize + Sync>(
            &self,
            url: &Url,
            _body: &B,
        ) -> ApiResult<T> {
            self.serve("POST", url)
        }

        async fn patch<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
            self.serve("PATCH", url)
        }

        async fn patch_ack(&self, url: &Url) -> ApiResult<()> {
            let _: serde_json::Value = self.serve("PATCH", url)?;
            Ok(())
        }
    }
}
