//! Trades panel: open positions with running profit.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Row, Table};
use ratatui::Frame;

use zlema_core::domain::pips::{display_pair, format_pips, price_decimals};

use crate::app::AppState;
use crate::theme::{self, Theme};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let trades = app.open_trades();
    if trades.is_empty() {
        let msg = if app.dashboard.trades.is_none() {
            "Waiting for trades..."
        } else {
            "No open trades. B buys, S sells at market."
        };
        f.render_widget(
            Paragraph::new(vec![Line::from(""), Line::from(Span::styled(msg, theme::muted()))]),
            area,
        );
        return;
    }

    let palette = Theme::default();
    let header = Row::new(vec!["ID", "Pair", "Side", "Size", "Entry", "P/L", "Account"])
        .style(theme::accent_bold());

    let rows: Vec<Row> = trades
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let account = match t.practice_mode {
                Some(true) => "practice",
                Some(false) => "broker",
                None => "-",
            };
            let mut style = Style::default().fg(palette.text_primary);
            if i == app.selected_trade {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(vec![
                Span::raw(format!("#{}", t.trade_id)),
                Span::raw(display_pair(&t.pair)),
                Span::styled(
                    t.direction.as_str(),
                    Style::default().fg(palette.direction_color(t.direction.as_str())),
                ),
                Span::raw(format!("{:.0}", t.size)),
                Span::raw(format!("{:.*}", price_decimals(&t.pair), t.entry_price)),
                Span::styled(format_pips(t.current_pl), theme::pnl(t.current_pl)),
                Span::styled(account, theme::muted()),
            ])
            .style(style)
        })
        .collect();

    let total: f64 = trades.iter().map(|t| t.current_pl).sum();
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .footer(
        Row::new(vec![
            Span::raw(""),
            Span::raw(""),
            Span::raw(""),
            Span::raw(""),
            Span::styled("Total", theme::muted()),
            Span::styled(format_pips(total), theme::pnl(total)),
        ]),
    );

    f.render_widget(table, area);
}
