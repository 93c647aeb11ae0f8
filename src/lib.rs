//! AI Chatbot
//!
//! A terminal chat client and the small HTTP service it talks to.
//!
//! # Architecture
//!
//! - **Client**: Ratatui front-end driving a [`chat::ChatView`] state machine
//! - **Server**: Axum service answering `POST /chat/` with one reply per message
//! - **LLM**: Streaming Chat Completions driver, collected into a single reply
//!
//! # Modules
//!
//! - [`chat`]: Client-side conversation state, wire types and transport
//! - [`config`]: Layered configuration and command line
//! - [`llm`]: LLM driver traits and implementations
//! - [`server`]: HTTP routes and error mapping
//! - [`session`]: Server-side conversation threads
//! - [`tui`]: Terminal rendering and key handling

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod llm;
pub mod server;
pub mod session;
pub mod tui;

use crate::config::AppConfig;

use llm::Orchestrator;
use session::ConversationStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// LLM orchestrator for chat interactions.
    pub orchestrator: Arc<Orchestrator>,
    /// Conversation threads keyed by client-supplied id.
    pub conversations: ConversationStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state whose new conversations start with the configured system prompt.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, orchestrator: Orchestrator) -> Self {
        let conversations = ConversationStore::new(config.llm.system_prompt.clone());
        Self {
            orchestrator: Arc::new(orchestrator),
            conversations,
            config,
        }
    }
}
