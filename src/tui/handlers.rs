//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::chat::ChatView;
use crate::chat::wire::ChatRequest;

/// Lines moved by PageUp/PageDown.
const PAGE: usize = 10;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond the state change already applied.
    None,
    /// Dispatch this request to the transport.
    Send(ChatRequest),
    /// Leave the application.
    Quit,
}

/// Apply a key press to the view.
pub fn handle_key_event(view: &mut ChatView, key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('t') if ctrl => {
            view.toggle_theme();
            Action::None
        }
        KeyCode::Enter => match view.begin_submit() {
            Ok(request) => Action::Send(request),
            Err(reason) => {
                tracing::debug!(%reason, "Submission ignored");
                Action::None
            }
        },
        KeyCode::Char(c) if !ctrl => {
            view.insert_char(c);
            Action::None
        }
        KeyCode::Backspace => {
            view.delete_char();
            Action::None
        }
        KeyCode::Up => {
            view.scroll_up(1);
            Action::None
        }
        KeyCode::Down => {
            view.scroll_down(1);
            Action::None
        }
        KeyCode::PageUp => {
            view.scroll_up(PAGE);
            Action::None
        }
        KeyCode::PageDown => {
            view.scroll_down(PAGE);
            Action::None
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Theme;

    fn press(view: &mut ChatView, code: KeyCode) -> Action {
        handle_key_event(view, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(view: &mut ChatView, text: &str) {
        for c in text.chars() {
            press(view, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut view = ChatView::new();
        type_text(&mut view, "Helloo");
        press(&mut view, KeyCode::Backspace);
        assert_eq!(view.draft(), "Hello");
    }

    #[test]
    fn test_enter_sends_draft() {
        let mut view = ChatView::new();
        type_text(&mut view, "Hello");

        let action = press(&mut view, KeyCode::Enter);

        match action {
            Action::Send(request) => assert_eq!(request.message, "Hello"),
            other => panic!("expected Send, got {other:?}"),
        }
        assert!(view.is_loading());

        // A second Enter while waiting is swallowed.
        assert_eq!(press(&mut view, KeyCode::Enter), Action::None);
        assert_eq!(view.history().len(), 1);
    }

    #[test]
    fn test_enter_on_blank_draft_does_nothing() {
        let mut view = ChatView::new();
        type_text(&mut view, "   ");
        assert_eq!(press(&mut view, KeyCode::Enter), Action::None);
        assert!(view.history().is_empty());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_ctrl_t_toggles_theme() {
        let mut view = ChatView::new();
        let action = handle_key_event(
            &mut view,
            KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        );
        assert_eq!(action, Action::None);
        assert_eq!(view.theme(), Theme::Light);
        assert_eq!(view.draft(), "");
    }

    #[test]
    fn test_quit_keys() {
        let mut view = ChatView::new();
        assert_eq!(press(&mut view, KeyCode::Esc), Action::Quit);
        let action = handle_key_event(
            &mut view,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn test_scroll_keys() {
        let mut view = ChatView::new();
        press(&mut view, KeyCode::PageUp);
        press(&mut view, KeyCode::Up);
        assert_eq!(view.scroll_back(), 11);
        press(&mut view, KeyCode::Down);
        press(&mut view, KeyCode::PageDown);
        assert_eq!(view.scroll_back(), 0);
    }
}
