//! Top navigation bar: panel tabs, market session clock, account mode, activity.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use zlema_core::domain::pips::display_pair;

use crate::app::{AppState, Panel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = vec![Span::styled(" ZLEMA Trader ", theme::accent_bold())];

    for panel in Panel::ALL {
        let label = format!(" {}:{} ", panel.index() + 1, panel.label());
        let style = if panel == app.active_panel {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else {
            theme::muted()
        };
        spans.push(Span::styled(label, style));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        format!(
            "{} {}",
            display_pair(&app.request.params.pair),
            app.request.params.timeframe
        ),
        theme::accent(),
    ));

    if let Some((status, _)) = &app.dashboard.market_status {
        let countdown = app.dashboard.market_countdown().unwrap_or_default();
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.current_session.clone(), theme::neutral()));
        spans.push(Span::styled(
            format!(" → {} in {countdown}", status.next_session),
            theme::muted(),
        ));
    }

    if let Some(status) = &app.dashboard.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            status.account_mode.as_str().to_uppercase(),
            theme::warning(),
        ));
    }

    if app.is_loading() {
        spans.push(Span::styled("  ⟳ loading", theme::neutral()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
