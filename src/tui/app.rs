//! Terminal event loop.
//!
//! The loop task is the only place the [`ChatView`] is touched. Requests run
//! on spawned tasks and report back over a channel, so drawing and key
//! handling never wait on the network.

use std::io::{self, Write};
use std::sync::Arc;

use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::{Stream, StreamExt};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tokio::sync::mpsc;

use super::handlers::{Action, handle_key_event};
use super::render::render;
use crate::chat::wire::ChatRequest;
use crate::chat::{ChatTransport, ChatView, RequestFailure};

type Outcome = Result<String, RequestFailure>;

/// Take over the terminal and run the chat until the user quits.
pub async fn run(view: ChatView, transport: Arc<dyn ChatTransport>) -> anyhow::Result<ChatView> {
    let guard = TerminalGuard::enter(io::stdout())?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let res = run_loop(&mut terminal, view, transport, EventStream::new()).await;

    drop(guard);
    res
}

/// Raw mode plus alternate screen on `out`, undone on drop.
///
/// Dropping also runs while a panic unwinds, so the shell is never left in
/// raw mode.
#[derive(Debug)]
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut guard = Self { out };
        execute!(guard.out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
    }
}

/// Drive `view` from terminal `events` and request completions.
///
/// Returns the final view state once a quit key is pressed or the event
/// stream ends.
pub async fn run_loop<B, S>(
    terminal: &mut Terminal<B>,
    mut view: ChatView,
    transport: Arc<dyn ChatTransport>,
    mut events: S,
) -> anyhow::Result<ChatView>
where
    B: Backend,
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let (tx, mut rx) = mpsc::channel::<Outcome>(8);

    tracing::info!(
        name: "chat.session.started",
        conversation_id = %view.conversation_id(),
        "Chat session started"
    );

    loop {
        terminal
            .draw(|f| render(f, &mut view))
            .map_err(|e| anyhow::anyhow!("failed to draw frame: {e}"))?;

        tokio::select! {
            Some(outcome) = rx.recv() => view.complete_submit(outcome),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key_event(&mut view, key) {
                        Action::Send(request) => {
                            dispatch(Arc::clone(&transport), request, tx.clone());
                        }
                        Action::Quit => break,
                        Action::None => {}
                    }
                }
                // Resize and friends only need a redraw.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    tracing::info!(
        name: "chat.session.ended",
        conversation_id = %view.conversation_id(),
        messages = view.history().len(),
        "Chat session ended"
    );

    Ok(view)
}

/// Send `request` on its own task and post the outcome back to the loop.
fn dispatch(transport: Arc<dyn ChatTransport>, request: ChatRequest, tx: mpsc::Sender<Outcome>) {
    tokio::spawn(async move {
        let outcome = transport.send(&request).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!("Chat loop closed before the reply arrived");
        }
    });
}
