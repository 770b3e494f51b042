//! Order sidebar: market pickers, unit size, BUY/SELL, open-position summary.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use zlema_core::domain::params::{MAX_UNITS, MIN_UNITS};
use zlema_core::domain::pips::{display_pair, format_pips};
use zlema_core::domain::LevelKind;

use crate::app::AppState;
use crate::theme;
use crate::ui::widgets::slider_line;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Order ")
        .title_style(theme::panel_title(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let params = &app.request.params;
    let mut lines: Vec<Line> = vec![
        picker("Pair", display_pair(&params.pair), "p/P"),
        picker("Timeframe", params.timeframe.to_string(), "t/T"),
        picker("Periods", params.periods.to_string(), "[/]"),
        slider_line(
            "Units",
            params.units as f64,
            (MIN_UNITS as f64, MAX_UNITS as f64),
            8,
            params.units.to_string(),
            false,
        ),
        Line::from(""),
    ];

    let price = match app.dashboard.current_price {
        Some(p) => format!("{p:+.1} pips"),
        None => "--".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled("      Close: ", theme::muted()),
        Span::styled(price, theme::accent_bold()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [B] BUY ", theme::positive().add_modifier(Modifier::REVERSED)),
        Span::raw("   "),
        Span::styled(" [S] SELL ", theme::negative().add_modifier(Modifier::REVERSED)),
    ]));
    lines.push(Line::from(""));

    let open = app.open_trades();
    let open_pl: f64 = open.iter().map(|t| t.current_pl).sum();
    lines.push(Line::from(vec![
        Span::styled(" Open trades: ", theme::muted()),
        Span::styled(open.len().to_string(), theme::accent()),
        Span::raw("  "),
        Span::styled(format_pips(open_pl), theme::pnl(open_pl)),
    ]));
    match app.selected_trade() {
        Some(trade) => lines.push(Line::from(vec![
            Span::styled(" Selected: ", theme::muted()),
            Span::styled(
                format!("#{} {} {}", trade.trade_id, trade.direction, trade.size),
                theme::neutral(),
            ),
        ])),
        None => lines.push(Line::from(Span::styled(" Selected: none", theme::muted()))),
    }
    lines.push(Line::from(Span::styled(
        " [c] close selected  [C] close all",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    let mut overlay_spans = vec![Span::styled(" Levels: ", theme::muted())];
    for kind in LevelKind::ALL {
        let style = if app.overlays.shows(kind) {
            theme::accent()
        } else {
            theme::muted().add_modifier(Modifier::DIM)
        };
        overlay_spans.push(Span::styled(format!("{} ", &kind.label()[..3]), style));
    }
    lines.push(Line::from(overlay_spans));

    let toggles = &app.request.toggles;
    lines.push(Line::from(vec![
        Span::styled(" Mode: ", theme::muted()),
        Span::styled(params.strategy.as_str(), theme::accent()),
        Span::styled(
            if toggles.polynomial { "  +poly" } else { "" },
            theme::neutral(),
        ),
    ]));

    f.render_widget(Paragraph::new(lines), inner);
}

fn picker<'a>(label: &str, value: String, keys: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:>11}: "), theme::muted()),
        Span::styled(format!("< {value} >"), theme::accent()),
        Span::styled(format!(" {keys}"), theme::muted()),
    ])
}
