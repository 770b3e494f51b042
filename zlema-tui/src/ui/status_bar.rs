//! Bottom status bar: last update time, last status message, key hints.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    let updated = match app.dashboard.last_update {
        Some(at) => format!(" Updated {}", at.format("%H:%M:%S")),
        None if app.dashboard.is_initial_load => " Loading dashboard...".to_string(),
        None => " No data".to_string(),
    };
    spans.push(Span::styled(updated, theme::muted()));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
        spans.push(Span::raw(" | "));
    }

    spans.push(Span::styled(
        "B/S:trade C:close all R:refresh e:errors ?:help q:quit",
        theme::muted(),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
