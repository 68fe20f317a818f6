use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Search title or id (enter keep, esc clear) ");

    let paragraph = Paragraph::new(Line::raw(app.search_input.as_str())).block(block);
    f.render_widget(paragraph, area);

    // Position cursor
    let x = area.x + 1 + app.search_input.chars().count() as u16;
    let y = area.y + 1;
    f.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), y));
}
