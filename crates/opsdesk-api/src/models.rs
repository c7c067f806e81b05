//! Wire types for the inbox backend API.
//!
//! The backend wraps every response in a `{ success, data, error? }`
//! envelope; domain payloads themselves deserialize directly into
//! `opsdesk-core` types.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Standard response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Unwrap an envelope into its payload.
///
/// A `success: false` envelope becomes a `RequestFailed` carrying the HTTP
/// status the response arrived with and the server's message, so callers
/// see backend-reported failures and HTTP failures uniformly.
pub(crate) fn unwrap_envelope<T>(status: u16, url: &Url, envelope: Envelope<T>) -> ApiResult<T> {
    if !envelope.success {
        return Err(ApiError::RequestFailed {
            status,
            url: url.to_string(),
            message: envelope.error,
        });
    }
    envelope.data.ok_or_else(|| ApiError::InvalidResponse {
        message: format!("missing data field in response from {url}"),
    })
}

/// Check a data-less envelope for success.
pub(crate) fn unwrap_ack(status: u16, url: &Url, envelope: Envelope<serde_json::Value>) -> ApiResult<()> {
    if envelope.success {
        Ok(())
    } else {
        Err(ApiError::RequestFailed {
            status,
            url: url.to_string(),
            message: envelope.error,
        })
    }
}

/// Request body for sending an operator reply.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyRequest<'a> {
    pub content: &'a str,
    pub channel: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("https://api.opsdesk.test/inbox/conversations").unwrap()
    }

    #[test]
    fn test_unwrap_success_envelope() {
        let envelope: Envelope<Vec<i32>> =
            serde_json::from_value(json!({"success": true, "data": [1, 2]})).unwrap();
        let data = unwrap_envelope(200, &url(), envelope).unwrap();
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn test_unwrap_failure_envelope_carries_server_message() {
        let envelope: Envelope<Vec<i32>> =
            serde_json::from_value(json!({"success": false, "error": "quota exceeded"})).unwrap();
        let err = unwrap_envelope(200, &url(), envelope).unwrap_err();
        match err {
            ApiError::RequestFailed {
                status, message, ..
            } => {
                assert_eq!(status, 200);
                assert_eq!(message.as_deref(), Some("quota exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_success_without_data_is_invalid_for_payload_calls() {
        let envelope: Envelope<Vec<i32>> =
            serde_json::from_value(json!({"success": true})).unwrap();
        let err = unwrap_envelope(200, &url(), envelope).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    #[test]
    fn test_ack_accepts_data_less_success() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(unwrap_ack(200, &url(), envelope).is_ok());
    }

    #[test]
    fn test_reply_request_wire_shape() {
        let body = ReplyRequest {
            content: "on my way",
            channel: "sms",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"content":"on my way","channel":"sms"}"#);
    }
}
