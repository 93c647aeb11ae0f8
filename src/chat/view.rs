//! State and behaviour of the chat view.
//!
//! [`ChatView`] owns everything the screen shows: the conversation id, the
//! thread, the draft being typed, the submission state and the theme. It is
//! driven from a single event loop; network calls happen elsewhere and their
//! results come back through [`ChatView::complete_submit`].

use thiserror::Error;

use super::client::{ChatTransport, RequestFailure};
use super::message::{ChatHistory, ChatMessage};
use super::theme::Theme;
use super::wire::ChatRequest;
use super::ConversationId;

/// Whether a message is currently awaiting its reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    Idle,
    Sending,
}

/// Why a submission was not accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// The draft is empty or whitespace only.
    #[error("draft is empty")]
    EmptyDraft,
    /// Another message is still waiting for its reply.
    #[error("a message is already being sent")]
    InFlight,
}

/// The single chat screen.
#[derive(Debug, Clone)]
pub struct ChatView {
    conversation_id: ConversationId,
    history: ChatHistory,
    draft: String,
    submission: Submission,
    theme: Theme,
    /// Lines scrolled up from the bottom of the thread. Zero follows the tail.
    scroll_back: usize,
    /// Furthest `scroll_back` can go, as of the last draw.
    scroll_limit: usize,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    /// Create a view for a brand new session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_conversation_id(ConversationId::generate())
    }

    /// Create a view bound to an existing conversation id.
    #[must_use]
    pub fn with_conversation_id(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            history: ChatHistory::new(),
            draft: String::new(),
            submission: Submission::Idle,
            theme: Theme::default(),
            scroll_back: 0,
            scroll_limit: usize::MAX,
        }
    }

    /// Start with the given theme instead of the default dark one.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    #[must_use]
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn insert_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn delete_char(&mut self) {
        self.draft.pop();
    }

    #[must_use]
    pub fn submission(&self) -> Submission {
        self.submission
    }

    /// True while the typing indicator should be shown.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.submission == Submission::Sending
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip between dark and light. Touches nothing but the theme.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    #[must_use]
    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self
            .scroll_back
            .saturating_add(lines)
            .min(self.scroll_limit);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Record how far the thread can scroll at the current screen size.
    ///
    /// Called by the renderer on every draw; the offset is clamped right
    /// away so scrolling past the top never has to be worked off.
    pub fn set_scroll_limit(&mut self, limit: usize) {
        self.scroll_limit = limit;
        self.scroll_back = self.scroll_back.min(limit);
    }

    /// Accept the current draft for sending.
    ///
    /// On success the view enters the loading state, the user's message is
    /// appended to the thread right away and the request to send is returned.
    /// Empty drafts and submissions while another one is in flight leave the
    /// view untouched.
    pub fn begin_submit(&mut self) -> Result<ChatRequest, SubmitRejected> {
        if self.draft.trim().is_empty() {
            return Err(SubmitRejected::EmptyDraft);
        }
        if self.submission == Submission::Sending {
            return Err(SubmitRejected::InFlight);
        }

        self.submission = Submission::Sending;
        self.append(ChatMessage::user(self.draft.clone()));

        Ok(ChatRequest::new(
            self.draft.clone(),
            self.conversation_id.clone(),
        ))
    }

    /// Reconcile the outcome of a request started by [`Self::begin_submit`].
    ///
    /// A reply is appended and clears the draft. A failure is logged and
    /// otherwise leaves the thread as it is, user message included.
    pub fn complete_submit(&mut self, outcome: Result<String, RequestFailure>) {
        match outcome {
            Ok(reply) => {
                self.append(ChatMessage::ai(reply));
                self.draft.clear();
            }
            Err(e) => {
                tracing::error!(
                    name: "chat.request.failed",
                    conversation_id = %self.conversation_id,
                    error = %e,
                    "Chat request failed"
                );
            }
        }
        self.submission = Submission::Idle;
    }

    /// Send the current draft through `transport` and wait for the outcome.
    pub async fn submit_message<T>(&mut self, transport: &T) -> Result<(), SubmitRejected>
    where
        T: ChatTransport + ?Sized,
    {
        let request = self.begin_submit()?;
        let outcome = transport.send(&request).await;
        self.complete_submit(outcome);
        Ok(())
    }

    fn append(&mut self, message: ChatMessage) {
        self.history.push(message);
        self.scroll_back = 0;
    }
}
