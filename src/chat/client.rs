//! HTTP transport for sending chat messages.

use thiserror::Error;
use url::Url;

use super::wire::ChatRequest;

/// Default chat endpoint of a locally running service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat/";

/// Any failure of a chat request.
///
/// Callers treat every variant the same way; the split only exists to
/// make the log line useful.
#[derive(Error, Debug)]
pub enum RequestFailure {
    /// Connection, TLS or body read failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// Success status but no string `response` field in the body.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// Something that can deliver a chat message and return the assistant reply.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one message and wait for the reply text.
    async fn send(&self, request: &ChatRequest) -> Result<String, RequestFailure>;
}

/// `reqwest`-backed transport posting JSON to the chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpChatClient {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a client with a custom `reqwest` client.
    pub fn with_client(
        endpoint: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        Ok(Self { endpoint, http })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn handle_response(response: reqwest::Response) -> Result<String, RequestFailure> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(RequestFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        extract_reply(&body)
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, RequestFailure> {
        tracing::debug!(
            endpoint = %self.endpoint,
            conversation_id = %request.conversation_id,
            "Posting chat message"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }
}

/// Pull the `response` string out of a success body.
fn extract_reply(body: &serde_json::Value) -> Result<String, RequestFailure> {
    body.get("response")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| RequestFailure::MalformedReply(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reply() {
        let reply = extract_reply(&json!({ "response": "Hi there!", "conversation_id": "1" }));
        assert_eq!(reply.unwrap(), "Hi there!");
    }

    #[test]
    fn test_extract_reply_rejects_missing_field() {
        let err = extract_reply(&json!({ "answer": "nope" })).unwrap_err();
        assert!(matches!(err, RequestFailure::MalformedReply(_)));
    }

    #[test]
    fn test_extract_reply_rejects_non_string() {
        let err = extract_reply(&json!({ "response": 42 })).unwrap_err();
        assert!(matches!(err, RequestFailure::MalformedReply(_)));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(HttpChatClient::new("not a url").is_err());
        let client = HttpChatClient::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_ENDPOINT);
    }
}
