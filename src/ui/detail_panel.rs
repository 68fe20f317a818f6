use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{priority_color, status_color, ACCENT};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Details ");

    let Some(item) = app.selected_item() else {
        f.render_widget(block, area);
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(item.title.as_str(), Style::default().fg(ACCENT))),
        Line::raw(""),
        field("ID: ", Span::raw(item.id.as_str())),
        field(
            "Status: ",
            Span::styled(
                item.status.display_name(),
                Style::default().fg(status_color(item.status)),
            ),
        ),
        field(
            "Priority: ",
            Span::styled(
                item.priority.as_str(),
                Style::default().fg(priority_color(item.priority)),
            ),
        ),
    ];

    if let Some(assignee) = &item.assigned_to {
        lines.push(field("Assignee: ", Span::raw(assignee.as_str())));
    }

    if let Some(due) = item.due_date {
        let overdue = due < chrono::Local::now().date_naive();
        let style = if overdue {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        lines.push(field("Due: ", Span::styled(due.to_string(), style)));
    }

    if let Some(desc) = &item.description {
        lines.push(Line::raw(""));
        let truncated: String = desc.chars().take(300).collect();
        lines.push(Line::raw(truncated));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![Span::styled(label, Style::default().fg(Color::Gray)), value])
}
