//! Account panel: balance, realised profit, win rate and the cumulative
//! profit curve; broker connection switch.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use zlema_core::domain::pips::format_pips;
use zlema_core::domain::AccountStatus;

use crate::app::AppState;
use crate::theme::{self, Theme};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);

    let Some(status) = &app.dashboard.status else {
        f.render_widget(
            Paragraph::new(Span::styled("Waiting for account status...", theme::muted())),
            chunks[0],
        );
        return;
    };

    let palette = Theme::default();
    let balance = status
        .account_balance
        .map_or_else(|| "n/a".to_string(), |b| format!("{b:.2}"));
    let win_rate = match status.win_rate() {
        Some(w) => Span::styled(
            format!("{:.1}%", w * 100.0),
            Style::default().fg(palette.win_rate_color(w)),
        ),
        None => Span::styled("--", theme::muted()),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Mode:          ", theme::muted()),
            Span::styled(status.account_mode.as_str().to_uppercase(), theme::warning()),
        ]),
        Line::from(vec![
            Span::styled("Balance:       ", theme::muted()),
            Span::styled(balance, theme::accent()),
        ]),
        Line::from(vec![
            Span::styled("Total profit:  ", theme::muted()),
            Span::styled(format_pips(status.total_profit), theme::pnl(status.total_profit)),
        ]),
        Line::from(vec![
            Span::styled("Trades:        ", theme::muted()),
            Span::styled(
                format!("{} closed, {} open", status.total_trades, status.open_trades_count),
                theme::accent(),
            ),
        ]),
        Line::from(vec![Span::styled("Win rate:      ", theme::muted()), win_rate]),
    ];
    for (name, value) in status.trading_stats.iter().take(2) {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<15}", format!("{name}:")), theme::muted()),
            Span::styled(value.to_string(), theme::neutral()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("[m] mode: ", theme::muted()),
        Span::styled(app.connect_mode.as_str(), theme::accent_bold()),
        Span::styled("  [Enter] connect", theme::muted()),
    ]));
    f.render_widget(Paragraph::new(lines), chunks[0]);

    render_profit_curve(f, chunks[1], status);
}

fn render_profit_curve(f: &mut Frame, area: Rect, status: &AccountStatus) {
    let curve = status.cumulative_profit();
    if curve.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No closed trades yet.", theme::muted())),
            area,
        );
        return;
    }

    let min_y = curve.iter().copied().fold(0.0_f64, f64::min);
    let max_y = curve.iter().copied().fold(0.0_f64, f64::max);
    let padding = ((max_y - min_y).abs() * 0.05).max(1.0);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = curve.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = curve
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let last = curve.last().copied().unwrap_or_default();

    let dataset = Dataset::default()
        .name("Cumulative pips")
        .marker(symbols::Marker::Braille)
        .style(theme::pnl(last))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled("Trades", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled("1", theme::muted()),
                    Span::styled(format!("{}", curve.len()), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Pips", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
