//! News panel: headlines for the selected pair with optional AI impact tags.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme::{self, Theme};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = vec![Line::from(vec![
        Span::styled("[j/k]scroll [a]AI analysis: ", theme::muted()),
        Span::styled(
            if app.news_ai { "on" } else { "off" },
            if app.news_ai { theme::positive() } else { theme::muted() },
        ),
    ])];
    lines.push(Line::from(""));

    let Some(feed) = &app.dashboard.news else {
        lines.push(Line::from(Span::styled("Waiting for news...", theme::muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    };
    if feed.news_items.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("No headlines for {}.", feed.currency_pair),
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let palette = Theme::default();
    for (i, item) in feed.news_items.iter().enumerate().skip(app.news_scroll) {
        let title_style = if i == app.news_scroll {
            theme::accent_bold()
        } else {
            theme::accent()
        };
        let mut header = vec![Span::styled(item.title.as_str(), title_style)];
        if let Some(analysis) = &item.analysis {
            header.push(Span::styled(
                format!("  {} ({})", analysis.impact, analysis.confidence),
                Style::default()
                    .fg(palette.impact_color(&analysis.impact))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(header));
        lines.push(Line::from(Span::styled(
            format!("{} · {}", item.source, item.published),
            theme::muted(),
        )));
        if !item.description.is_empty() {
            lines.push(Line::from(Span::styled(
                item.description.as_str(),
                Style::default().fg(palette.text_secondary),
            )));
        }
        if let Some(analysis) = item.analysis.as_ref().filter(|a| !a.reasoning.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("↳ {}", analysis.reasoning),
                theme::neutral(),
            )));
        }
        lines.push(Line::from(""));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
