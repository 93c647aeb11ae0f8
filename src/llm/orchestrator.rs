//! Turn a streamed upstream response into one reply.
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_chatbot::llm::{Message, Orchestrator};
//!
//! let orchestrator = Orchestrator::new(settings);
//! let reply = orchestrator.complete(vec![Message::user("Hello")]).await?;
//! ```

use std::sync::Arc;

use futures::StreamExt;
use uuid::Uuid;

use super::{ChatCompletionsDriver, LlmDriver, LlmEvent, LlmRequest, LlmSettings, Message};

/// Runs a conversation through an [`LlmDriver`] and collects the reply text.
#[derive(Clone)]
pub struct Orchestrator {
    model: String,
    driver: Arc<dyn LlmDriver>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("model", &self.model)
            .field("driver", &"LlmDriver")
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator talking to the Chat Completions API.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        let model = settings.model.clone();
        Self {
            model,
            driver: Arc::new(ChatCompletionsDriver::new(settings)),
        }
    }

    /// Create an orchestrator over an arbitrary driver.
    #[must_use]
    pub fn with_driver(model: impl Into<String>, driver: Arc<dyn LlmDriver>) -> Self {
        Self {
            model: model.into(),
            driver,
        }
    }

    /// Model the orchestrator asks for.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` upstream and return the full assistant reply.
    ///
    /// The upstream response is streamed; text deltas are concatenated until
    /// the stream ends or reports `[DONE]`. A stream that closes with neither
    /// text nor `[DONE]` is an error.
    pub async fn complete(&self, messages: Vec<Message>) -> anyhow::Result<String> {
        let request_id = Uuid::new_v4().to_string();

        tracing::debug!(
            request_id = %request_id,
            model = %self.model,
            message_count = messages.len(),
            "Starting completion"
        );

        let mut stream = self.driver.stream(LlmRequest { messages }).await?;
        let mut content = String::new();
        let mut finished = false;

        while let Some(event_result) = stream.next().await {
            match event_result {
                Ok(LlmEvent::Delta(text)) => content.push_str(&text),
                Ok(LlmEvent::Done) => {
                    finished = true;
                    break;
                }
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "Error in stream");
                    return Err(e);
                }
            }
        }

        if content.is_empty() && !finished {
            anyhow::bail!("upstream stream ended without any content");
        }

        tracing::debug!(
            request_id = %request_id,
            content_length = content.len(),
            "Completion finished"
        );

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmStream;
    use futures::stream;
    use std::sync::Mutex;

    /// Driver replaying a fixed list of events and remembering its input.
    struct ScriptedDriver {
        events: Vec<Result<LlmEvent, String>>,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait::async_trait]
    impl LlmDriver for ScriptedDriver {
        async fn stream(&self, req: LlmRequest) -> anyhow::Result<LlmStream> {
            *self.seen.lock().unwrap() = req.messages;
            let events: Vec<anyhow::Result<LlmEvent>> = self
                .events
                .iter()
                .cloned()
                .map(|e| e.map_err(anyhow::Error::msg))
                .collect();
            Ok(Box::pin(stream::iter(events)))
        }
    }

    fn orchestrator(events: Vec<Result<LlmEvent, String>>) -> (Orchestrator, Arc<ScriptedDriver>) {
        let driver = Arc::new(ScriptedDriver {
            events,
            seen: Mutex::new(Vec::new()),
        });
        let driver_dyn: Arc<dyn LlmDriver> = Arc::<ScriptedDriver>::clone(&driver);
        (Orchestrator::with_driver("test-model", driver_dyn), driver)
    }

    #[tokio::test]
    async fn test_collects_deltas() {
        let (orch, driver) = orchestrator(vec![
            Ok(LlmEvent::Delta("Hi ".to_string())),
            Ok(LlmEvent::Delta("there!".to_string())),
            Ok(LlmEvent::Done),
            Ok(LlmEvent::Delta("ignored".to_string())),
        ]);

        let reply = orch.complete(vec![Message::user("Hello")]).await.unwrap();

        assert_eq!(reply, "Hi there!");
        assert_eq!(driver.seen.lock().unwrap().as_slice(), &[Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_stream_error_fails_completion() {
        let (orch, _) = orchestrator(vec![
            Ok(LlmEvent::Delta("partial".to_string())),
            Err("connection reset".to_string()),
        ]);

        let err = orch.complete(vec![Message::user("Hello")]).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_silent_stream_is_an_error() {
        let (orch, _) = orchestrator(Vec::new());
        let err = orch.complete(vec![Message::user("Hello")]).await.unwrap_err();
        assert!(err.to_string().contains("without any content"));
    }

    #[tokio::test]
    async fn test_empty_reply_with_done_marker() {
        let (orch, _) = orchestrator(vec![Ok(LlmEvent::Done)]);
        assert_eq!(orch.complete(Vec::new()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_stream_without_done_marker() {
        let (orch, _) = orchestrator(vec![Ok(LlmEvent::Delta("ok".to_string()))]);
        assert_eq!(orch.complete(Vec::new()).await.unwrap(), "ok");
    }
}
