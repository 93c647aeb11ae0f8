//! Upstream LLM access for the chat service.
//!
//! The service talks to any OpenAI-compatible Chat Completions API
//! (`/v1/chat/completions`). Responses are streamed over SSE and collected
//! into a single reply before being handed back to the caller.
//!
//! # Overview
//!
//! - [`LlmDriver`]: streaming interface over one upstream protocol
//! - [`ChatCompletionsDriver`]: the Chat Completions implementation
//! - [`Orchestrator`]: collects a driver stream into a finished reply
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_chatbot::llm::{LlmSettings, Message, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(settings);
//! let reply = orchestrator
//!     .complete(vec![Message::user("Hello")])
//!     .await?;
//! ```

pub mod chat_completions;
pub mod orchestrator;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use orchestrator::Orchestrator;
pub use provider::Provider;

use futures::Stream;

/// LLM connection and sampling settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.groq.com/openai`).
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `llama-3.1-8b-instant`).
    pub model: String,
    /// Provider type, detected from `base_url`.
    pub provider: Provider,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .finish()
    }
}

/// A message in an upstream conversation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unsupported role: {other}")),
        }
    }
}

/// Request to an LLM driver.
#[derive(Debug)]
pub struct LlmRequest {
    /// Conversation messages, oldest first.
    pub messages: Vec<Message>,
}

/// Events produced while a reply streams in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmEvent {
    /// Incremental text of the assistant's reply.
    Delta(String),
    /// The upstream signalled the end of the stream.
    Done,
}

/// Boxed stream of [`LlmEvent`]s returned by drivers.
pub type LlmStream =
    std::pin::Pin<Box<dyn Stream<Item = anyhow::Result<LlmEvent>> + Send>>;

/// Trait for LLM streaming drivers.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Stream a response from the LLM.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the connection is interrupted.
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<LlmStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in ["system", "user", "assistant"] {
            let parsed: MessageRole = role.parse().unwrap();
            assert_eq!(serde_json::to_value(parsed).unwrap(), role);
        }
        assert!("tool".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = LlmSettings {
            base_url: "https://api.groq.com/openai".to_string(),
            api_key: Some("gsk_secret".to_string()),
            model: "llama-3.1-8b-instant".to_string(),
            provider: Provider::Groq,
            temperature: 1.0,
            max_tokens: 1024,
            top_p: 1.0,
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
