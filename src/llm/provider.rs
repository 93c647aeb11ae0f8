//! Provider detection and endpoint construction.

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// Groq (groq.com)
    Groq,
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Generic OpenAI-compatible provider
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ai_chatbot::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://api.groq.com/openai");
    /// assert_eq!(provider, Provider::Groq);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Build the chat completions URL for this provider.
    ///
    /// `OpenRouter` serves the API under `/api`, everything else at the root
    /// of the configured base URL.
    #[must_use]
    pub fn build_chat_url(self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::OpenRouter if !base.ends_with("/api") => {
                format!("{base}/api/v1/chat/completions")
            }
            _ => format!("{base}/v1/chat/completions"),
        }
    }
}
