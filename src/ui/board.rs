use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;
use crate::model::work_item::Status;
use crate::ui::theme::{priority_color, priority_marker, status_color, ACCENT};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Status::ALL.map(|_| Constraint::Ratio(1, Status::ALL.len() as u32)))
        .split(area);

    for (status, column_area) in Status::ALL.into_iter().zip(columns.iter()) {
        render_column(f, *column_area, app, status);
    }
}

fn render_column(f: &mut Frame, area: Rect, app: &App, status: Status) {
    let focused = app.column == status;
    let visible = app.board.filtered(status);

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = focused && i == app.selected_row;

            let marker = Span::styled(
                priority_marker(item.priority),
                Style::default().fg(priority_color(item.priority)),
            );

            // Truncate title to fit
            let max_title = area.width.saturating_sub(4) as usize;
            let title: String = item.title.chars().take(max_title).collect();
            let title_style = if selected {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };

            let mut lines = vec![Line::from(vec![marker, Span::styled(title, title_style)])];
            let assignee = item.assigned_to.as_deref().unwrap_or("unassigned");
            lines.push(Line::from(Span::styled(
                format!("  {} · {assignee}", item.id),
                Style::default().fg(Color::DarkGray),
            )));
            ListItem::new(lines)
        })
        .collect();

    let total = app.board.list(status).len();
    let count = if visible.len() == total {
        format!("{total}")
    } else {
        format!("{}/{total}", visible.len())
    };
    let mut title = format!(" {} ({count}) ", status.display_name());
    if app.loading && status == Status::Todo {
        title.push_str("loading... ");
    }

    let border = if focused { ACCENT } else { status_color(status) };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );

    f.render_widget(list, area);
}
