pub mod board;
pub mod detail_panel;
pub mod footer;
pub mod search_bar;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, InputMode};

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    // Search prompt takes a bordered box, otherwise a single footer line
    let bottom_height = if app.input_mode == InputMode::Search { 3 } else { 1 };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(bottom_height)])
        .split(size);

    // Columns (78%) + Detail (22%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(78), Constraint::Percentage(22)])
        .split(vertical[0]);

    board::render(f, horizontal[0], app);
    detail_panel::render(f, horizontal[1], app);

    if app.input_mode == InputMode::Search {
        search_bar::render(f, vertical[1], app);
    } else {
        footer::render(f, vertical[1], app);
    }
}
