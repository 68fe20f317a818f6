use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match &app.input_mode {
        InputMode::ConfirmDelete(id) => {
            spans.push(Span::styled(
                format!(" delete {id}? "),
                Style::default().fg(Color::Red),
            ));
            spans.push(hint("y", "confirm"));
            spans.push(hint("any", "cancel"));
        }
        _ => {
            spans.push(hint("←→↑↓", "navigate"));
            spans.push(hint("shift+←→", "move"));
            spans.push(hint("shift+↑↓", "reorder"));
            spans.push(hint("/", "search"));
            spans.push(hint("m", "mine"));
            spans.push(hint("d", "delete"));
            spans.push(hint("r", "refresh"));
            spans.push(hint("q", "quit"));
        }
    }

    // Who is signed in
    spans.push(Span::raw("  "));
    match &app.actor {
        Some(actor) => spans.push(Span::styled(
            format!(" {actor} "),
            Style::default().fg(Color::Black).bg(Color::Green),
        )),
        None => spans.push(Span::styled(
            " SIGNED OUT ",
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )),
    }

    if app.mine_only {
        spans.push(Span::styled(" MINE ", Style::default().fg(Color::Black).bg(Color::Cyan)));
    }
    if !app.search_input.is_empty() {
        spans.push(Span::styled(
            format!(" /{} ", app.search_input),
            Style::default().fg(Color::Yellow),
        ));
    }
    if !app.board.filter().is_empty() {
        spans.push(Span::styled(
            format!(" {} shown ", app.board.filtered_board().total()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.moves_in_flight > 0 {
        spans.push(Span::styled(
            format!(" syncing {} ", app.moves_in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }

    // Flash message
    if let Some((msg, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Yellow)));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line);
    f.render_widget(paragraph, area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(Color::DarkGray),
    )
}
