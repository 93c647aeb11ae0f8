//! Conversation threads and their in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::llm::{Message, MessageRole};

/// A single conversation thread as sent upstream.
///
/// Cheap to clone; clones share the same message list.
#[derive(Debug, Clone)]
pub struct Conversation {
    inner: Arc<ConversationInner>,
}

#[derive(Debug)]
struct ConversationInner {
    /// Client-supplied conversation identifier.
    id: String,
    /// Messages in upstream order, system prompt first.
    messages: RwLock<Vec<Message>>,
}

impl Conversation {
    /// Create a conversation seeded with `system_prompt`.
    fn new(id: String, system_prompt: &str) -> Self {
        let mut messages = Vec::new();
        if !system_prompt.is_empty() {
            messages.push(Message::system(system_prompt));
        }
        Self {
            inner: Arc::new(ConversationInner {
                id,
                messages: RwLock::new(messages),
            }),
        }
    }

    /// Get the conversation ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Add a message with the given role.
    pub fn add_message(&self, role: MessageRole, content: impl Into<String>) {
        self.inner
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Message::new(role, content));
    }

    /// Add an assistant reply.
    pub fn add_assistant_message(&self, content: impl Into<String>) {
        self.add_message(MessageRole::Assistant, content);
    }

    /// Snapshot of all messages, system prompt included.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Thread-safe store of conversations keyed by conversation id.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    inner: Arc<ConversationStoreInner>,
}

#[derive(Debug)]
struct ConversationStoreInner {
    system_prompt: String,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl ConversationStore {
    /// Create an empty store whose new conversations start with `system_prompt`.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ConversationStoreInner {
                system_prompt: system_prompt.into(),
                conversations: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Get a conversation by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        let guard = self
            .inner
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    /// Get a conversation by ID, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Conversation {
        // Try read-only first
        if let Some(conversation) = self.get(id) {
            return conversation;
        }

        let mut guard = self
            .inner
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(conversation_id = %id, "Creating conversation");
                Conversation::new(id.to_string(), &self.inner.system_prompt)
            })
            .clone()
    }

    /// Get the number of known conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_lifecycle() {
        let store = ConversationStore::new("You are a useful AI assistant.");
        let conversation = store.get_or_create("c-1");

        assert_eq!(conversation.id(), "c-1");
        assert_eq!(conversation.message_count(), 1);

        conversation.add_message(MessageRole::User, "Hello");
        conversation.add_assistant_message("Hi there!");

        let messages = conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1], Message::user("Hello"));
        assert_eq!(messages[2], Message::assistant("Hi there!"));
    }

    #[test]
    fn test_get_or_create_reuses_thread() {
        let store = ConversationStore::new("prompt");
        assert!(store.is_empty());
        assert!(store.get("c-1").is_none());

        store.get_or_create("c-1").add_message(MessageRole::User, "one");
        store.get_or_create("c-1").add_message(MessageRole::User, "two");
        store.get_or_create("c-2");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("c-1").unwrap().message_count(), 3);
        assert_eq!(store.get("c-2").unwrap().message_count(), 1);
    }

    #[test]
    fn test_empty_system_prompt_is_skipped() {
        let store = ConversationStore::new("");
        assert_eq!(store.get_or_create("c").message_count(), 0);
    }
}
