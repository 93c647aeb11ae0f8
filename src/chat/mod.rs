//! Client side of the chat: view state, messages and transport.
//!
//! # Architecture
//!
//! - [`ChatView`]: owns the thread, draft, theme and submission state
//! - [`ChatTransport`]: delivers one message and returns the reply
//! - [`HttpChatClient`]: `reqwest` implementation posting to `/chat/`
//!
//! # Example
//!
//! ```rust
//! use ai_chatbot::chat::{ChatMessage, ChatView};
//!
//! let mut view = ChatView::new();
//! view.set_draft("Hello");
//!
//! let request = view.begin_submit().unwrap();
//! assert_eq!(request.message, "Hello");
//! assert!(view.is_loading());
//!
//! view.complete_submit(Ok("Hi there!".to_string()));
//! assert_eq!(view.history().last(), Some(&ChatMessage::ai("Hi there!")));
//! ```

pub mod client;
mod conversation;
mod message;
mod theme;
mod view;
pub mod wire;

pub use client::{ChatTransport, HttpChatClient, RequestFailure};
pub use conversation::ConversationId;
pub use message::{ChatHistory, ChatMessage, Sender};
pub use theme::{Palette, Theme};
pub use view::{ChatView, Submission, SubmitRejected};
