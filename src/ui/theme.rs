use ratatui::style::Color;

use crate::model::work_item::{Priority, Status};

pub const ACCENT: Color = Color::Cyan;

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Red,
        Priority::High => Color::Yellow,
        Priority::Medium => Color::Blue,
        Priority::Low => Color::Gray,
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::Gray,
        Status::InProgress => Color::Cyan,
        Status::Resolved => Color::Rgb(0xCE, 0x93, 0xD8),
        Status::Testing => Color::Yellow,
        Status::Done => Color::Green,
    }
}

pub fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => "!!",
        Priority::High => "! ",
        Priority::Medium => "· ",
        Priority::Low => "  ",
    }
}
