//! Drawing the chat view with ratatui.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use unicode_width::UnicodeWidthStr;

use crate::chat::{ChatView, Palette};

/// Widest the chat card gets, in columns.
const CARD_MAX_WIDTH: u16 = 72;
/// Width of the send button including its border.
const BUTTON_WIDTH: u16 = 8;
const TITLE: &str = "AI Chatbot";
const PLACEHOLDER: &str = "Type your message...";
const TYPING_INDICATOR: &str = "...";

/// Draw the whole screen for `view`.
pub fn render(f: &mut Frame, view: &mut ChatView) {
    let palette = view.theme().palette();
    let area = f.area();

    f.render_widget(Block::default().style(palette.background), area);

    let card = centered_card(area);
    let card_block = Block::default().style(palette.container);
    let inner = card_block.inner(card);
    f.render_widget(card_block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title + theme toggle
            Constraint::Min(3),    // Messages
            Constraint::Length(3), // Input form
        ])
        .split(inner);

    render_header(f, view, &palette, chunks[0]);
    render_messages(f, view, &palette, chunks[1]);
    render_input(f, view, &palette, chunks[2]);
}

fn centered_card(area: Rect) -> Rect {
    let width = area.width.min(CARD_MAX_WIDTH);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

fn render_header(f: &mut Frame, view: &ChatView, palette: &Palette, area: Rect) {
    let title = Paragraph::new(Span::styled(TITLE, palette.title));
    f.render_widget(title, area);

    let toggle = Paragraph::new(Line::from(vec![
        Span::styled("Ctrl-T ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(format!(" {} ", view.theme().icon()), palette.toggle),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(toggle, area);
}

fn render_messages(f: &mut Frame, view: &mut ChatView, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = thread_lines(view, palette, usize::from(inner.width));

    // Follow the tail unless the user scrolled back.
    let visible = usize::from(inner.height);
    let max_top = lines.len().saturating_sub(visible);
    view.set_scroll_limit(max_top);
    let top = max_top - view.scroll_back();

    let thread = Paragraph::new(lines).scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    f.render_widget(thread, inner);
}

/// Lay out every bubble of the thread as pre-wrapped lines.
fn thread_lines(view: &ChatView, palette: &Palette, width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * 2 / 3).max(1);
    let mut lines = Vec::new();

    for message in view.history() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let (style, alignment) = if message.is_user() {
            (palette.user_bubble, Alignment::Right)
        } else {
            (palette.ai_bubble, Alignment::Left)
        };
        lines.extend(bubble(&message.text, bubble_width, style, alignment));
    }

    if view.is_loading() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let style = palette.ai_bubble.add_modifier(Modifier::SLOW_BLINK);
        lines.extend(bubble(TYPING_INDICATOR, bubble_width, style, Alignment::Left));
    }

    lines
}

/// One message rendered as a padded rectangle of styled lines.
fn bubble(text: &str, max_width: usize, style: Style, alignment: Alignment) -> Vec<Line<'static>> {
    // One column of padding on each side.
    let text_width = max_width.saturating_sub(2).max(1);
    let rows = wrap(text, text_width);
    let inner_width = rows.iter().map(|r| r.width()).max().unwrap_or(0);

    rows.into_iter()
        .map(|row| {
            let pad = inner_width - row.width();
            let cell = format!(" {row}{} ", " ".repeat(pad));
            Line::from(Span::styled(cell, style)).alignment(alignment)
        })
        .collect()
}

/// Word-wrap `text` to at most `width` display columns per row.
///
/// Words longer than a row are split. Explicit newlines are kept.
fn wrap(text: &str, width: usize) -> Vec<String> {
    use textwrap::{Options, WordSplitter};

    let options = Options::new(width.max(1)).word_splitter(WordSplitter::NoHyphenation);
    textwrap::wrap(text, options)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn render_input(f: &mut Frame, view: &ChatView, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(BUTTON_WIDTH)])
        .split(area);

    let text = if view.draft().is_empty() {
        Span::styled(PLACEHOLDER, palette.input.add_modifier(Modifier::DIM))
    } else {
        Span::styled(view.draft().to_string(), palette.input)
    };
    let input = Paragraph::new(text).style(palette.input).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.input_border),
    );
    f.render_widget(input, chunks[0]);

    let button = Paragraph::new(Span::styled("Send", palette.button))
        .alignment(Alignment::Center)
        .style(palette.button)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.input_border),
        );
    f.render_widget(button, chunks[1]);

    let draft_width = u16::try_from(view.draft().width()).unwrap_or(u16::MAX);
    let max_x = chunks[0].x + chunks[0].width.saturating_sub(2);
    f.set_cursor_position((
        (chunks[0].x + 1).saturating_add(draft_width).min(max_x),
        chunks[0].y + 1,
    ));
}
