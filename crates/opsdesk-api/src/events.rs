//! Server-sent event feed for realtime inbox events.
//!
//! Connects to the backend's event stream, decodes `new-message` and
//! `conversation-update` events into core [`RealtimeEvent`]s, and forwards
//! them over an mpsc channel. Drops and errors reconnect after a fixed
//! delay; the polling backstop covers anything missed in between.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use opsdesk_core::RealtimeEvent;

use crate::config::ApiClientConfig;
use crate::error::{ApiError, ApiResult};

/// Why a single stream attempt ended.
enum FeedEnd {
    /// The receiving side of the channel is gone; stop for good.
    SubscriberGone,
    /// The connection dropped; reconnect.
    Disconnected,
}

/// Long-lived subscription to the backend's push channel.
///
/// One feed per authenticated session; the store-side bridge fans its
/// events out.
pub struct EventFeed {
    client: reqwest::Client,
    config: ApiClientConfig,
    cancel: CancellationToken,
}

impl EventFeed {
    /// Create a feed from configuration.
    #[must_use]
    pub fn new(config: ApiClientConfig, cancel: CancellationToken) -> Self {
        // No request timeout: the stream stays open indefinitely.
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");
        Self {
            client,
            config,
            cancel,
        }
    }

    /// Run until cancelled or the subscriber goes away, reconnecting on
    /// drops.
    pub async fn run(self, tx: mpsc::Sender<RealtimeEvent>) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("event feed stopped");
                    return;
                }
                result = self.stream_once(&tx) => {
                    match result {
                        Ok(FeedEnd::SubscriberGone) => return,
                        Ok(FeedEnd::Disconnected) => {
                            warn!("event feed disconnected, reconnecting");
                        }
                        Err(e) => {
                            warn!(error = %e, "event feed error, reconnecting");
                        }
                    }
                }
            }

            tokio::select! {
                () = self.cancel.cancelled() => return,
                () = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }
    }

    /// Spawn the feed onto the current runtime.
    pub fn spawn(self, tx: mpsc::Sender<RealtimeEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }

    async fn stream_once(&self, tx: &mpsc::Sender<RealtimeEvent>) -> ApiResult<FeedEnd> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = Url::parse(&format!("{base}/inbox/events"))?;

        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "text/event-stream")
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("X-Business-Id", &self.config.business_id)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
                message: None,
            });
        }
        debug!("event feed connected");

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find("\n\n") {
                let block: String = buffer.drain(..pos + 2).collect();
                let Some((name, data)) = parse_event_block(&block) else {
                    continue;
                };
                match decode_event(&name, &data) {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            return Ok(FeedEnd::SubscriberGone);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, event = %name, "skipping undecodable event"),
                }
            }
        }
        Ok(FeedEnd::Disconnected)
    }
}

/// Split one SSE block into its event name and joined data payload.
///
/// Returns `None` for comment-only and keep-alive blocks. A block without
/// an `event:` line gets the protocol default name `message`.
fn parse_event_block(block: &str) -> Option<(String, String)> {
    let mut name: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // id: fields and ":" comments are ignored
    }
    let data = data_lines.join("\n");
    if data.is_empty() {
        return None;
    }
    Some((name.unwrap_or_else(|| "message".to_string()), data))
}

/// Decode a named SSE payload into a core event.
///
/// Unknown event names (pings, future additions) decode to `None` rather
/// than an error.
fn decode_event(name: &str, data: &str) -> ApiResult<Option<RealtimeEvent>> {
    match name {
        "new-message" => Ok(Some(RealtimeEvent::NewMessage {
            message: serde_json::from_str(data)?,
        })),
        "conversation-update" => Ok(Some(RealtimeEvent::ConversationUpdate {
            conversation: serde_json::from_str(data)?,
        })),
        _ => Ok(None),
    }
}
