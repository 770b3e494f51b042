//! Help panel: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-6 / Tab", "Switch panel");
    key(&mut lines, "R", "Refresh everything now");
    key(&mut lines, "Esc", "Cancel in-flight requests");
    key(&mut lines, "x", "Dismiss error banner");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "q / Ctrl+C", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Order sidebar");
    key(&mut lines, "p / P", "Next / previous pair");
    key(&mut lines, "t / T", "Next / previous timeframe");
    key(&mut lines, "[ / ]", "Fewer / more periods");
    key(&mut lines, "- / +", "Decrease / increase units");
    key(&mut lines, "B / S", "Market BUY / SELL");
    key(&mut lines, "C", "Close all open trades");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1: Chart");
    key(&mut lines, "s r v f o", "Support, resistance, volume, fibonacci, pivots");
    key(&mut lines, "z", "Zero-lag bands instead of ribbons");
    key(&mut lines, "y", "Polynomial forecast");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2: Trades");
    key(&mut lines, "j / k", "Select trade");
    key(&mut lines, "c / Enter", "Close selected trade");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3: Strategy");
    key(&mut lines, "j / k", "Select row");
    key(&mut lines, "h / l", "Adjust slider or toggle");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4: Account");
    key(&mut lines, "m", "Cycle target mode (test, practice, live)");
    key(&mut lines, "Enter", "Connect to the target mode");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 5: News");
    key(&mut lines, "j / k", "Scroll headlines");
    key(&mut lines, "a", "Toggle AI impact analysis");

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>14}  "), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
