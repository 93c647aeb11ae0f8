//! Conversation thread management for the chat service.
//!
//! The service is stateless towards its clients: every request carries a
//! conversation id and the matching thread is looked up (or created) here.
//! Threads live in memory only.
//!
//! # Example
//!
//! ```rust
//! use ai_chatbot::llm::MessageRole;
//! use ai_chatbot::session::ConversationStore;
//!
//! let store = ConversationStore::new("You are a useful AI assistant.");
//! let conversation = store.get_or_create("1700000000000");
//! conversation.add_message(MessageRole::User, "Hello!");
//!
//! // System prompt plus the user message.
//! assert_eq!(conversation.message_count(), 2);
//! ```

mod thread;

pub use thread::{Conversation, ConversationStore};
