//! JSON bodies exchanged over `POST /chat/`.
//!
//! Both the terminal client and the chat service use these types, so the
//! two sides cannot drift apart.

use serde::{Deserialize, Serialize};

use super::ConversationId;

/// Role assumed when a request does not name one.
pub const DEFAULT_ROLE: &str = "user";

/// Request body for `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Raw text typed by the user.
    pub message: String,
    /// Role recorded in the upstream thread (defaults to `user`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Session correlation token.
    pub conversation_id: ConversationId,
}

impl ChatRequest {
    #[must_use]
    pub fn new(message: impl Into<String>, conversation_id: ConversationId) -> Self {
        Self {
            message: message.into(),
            role: None,
            conversation_id,
        }
    }

    /// Role to record for this message.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }
}

/// Successful response body for `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant reply text.
    pub response: String,
    /// Echo of the request's conversation id.
    pub conversation_id: ConversationId,
}

/// Error body returned with any non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_payload_has_exactly_two_fields() {
        let req = ChatRequest::new("Hello", ConversationId::from("c-1"));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({ "message": "Hello", "conversation_id": "c-1" })
        );
    }

    #[test]
    fn test_role_defaults_to_user() {
        let req: ChatRequest =
            serde_json::from_value(json!({ "message": "hi", "conversation_id": "x" })).unwrap();
        assert_eq!(req.role(), "user");

        let req: ChatRequest = serde_json::from_value(
            json!({ "message": "hi", "role": "system", "conversation_id": "x" }),
        )
        .unwrap();
        assert_eq!(req.role(), "system");
    }
}
