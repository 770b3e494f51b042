//! Strategy panel: indicator toggles and polynomial forecast sliders.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use zlema_core::domain::params::{
    DEGREE_RANGE, FORECAST_RANGE, LOOKBACK_RANGE, ZL_LENGTH_OPTIONS,
};

use crate::app::{AppState, StrategyField};
use crate::theme;
use crate::ui::widgets::slider_line;

const SLIDER_WIDTH: usize = 20;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let request = &app.request;
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "[j/k]navigate [h/l]adjust [Space]toggle",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(Span::styled("Signals", theme::accent_bold())),
    ];

    for field in StrategyField::ALL {
        let active = field == app.strategy_field;
        let line = match field {
            StrategyField::Zlema1 => toggle_line(field, request.toggles.zlema1, active),
            StrategyField::ZeroLag => toggle_line(field, request.toggles.zero_lag, active),
            StrategyField::ZlLength => {
                let lo = ZL_LENGTH_OPTIONS[0] as f64;
                let hi = ZL_LENGTH_OPTIONS[ZL_LENGTH_OPTIONS.len() - 1] as f64;
                slider_line(
                    field.label(),
                    request.params.zl_length as f64,
                    (lo, hi),
                    SLIDER_WIDTH,
                    request.params.zl_length.to_string(),
                    active,
                )
            }
            StrategyField::Polynomial => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Polynomial forecast",
                    theme::accent_bold(),
                )));
                toggle_line(field, request.toggles.polynomial, active)
            }
            StrategyField::Lookback => range_slider(
                field,
                request.polynomial.lookback,
                (*LOOKBACK_RANGE.start(), *LOOKBACK_RANGE.end()),
                active,
            ),
            StrategyField::Forecast => range_slider(
                field,
                request.polynomial.forecast_periods,
                (*FORECAST_RANGE.start(), *FORECAST_RANGE.end()),
                active,
            ),
            StrategyField::Degree => range_slider(
                field,
                request.polynomial.degree,
                (*DEGREE_RANGE.start(), *DEGREE_RANGE.end()),
                active,
            ),
        };
        lines.push(line);
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Request strategy: ", theme::muted()),
        Span::styled(request.params.strategy.as_str(), theme::accent()),
        Span::styled(
            format!("  windows: {}", request.params.window_lengths_param()),
            theme::muted(),
        ),
    ]));
    if !request.toggles.polynomial {
        lines.push(Line::from(Span::styled(
            "Forecast settings apply once the polynomial overlay is on.",
            theme::muted(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn toggle_line<'a>(field: StrategyField, on: bool, active: bool) -> Line<'a> {
    let label_style = if active {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::muted()
    };
    let (mark, mark_style) = if on {
        ("[x] on", theme::positive())
    } else {
        ("[ ] off", theme::muted())
    };
    Line::from(vec![
        Span::styled(format!("{:>11}: ", field.label()), label_style),
        Span::styled(mark, mark_style),
    ])
}

fn range_slider<'a>(field: StrategyField, value: u32, (lo, hi): (u32, u32), active: bool) -> Line<'a> {
    slider_line(
        field.label(),
        value as f64,
        (lo as f64, hi as f64),
        SLIDER_WIDTH,
        value.to_string(),
        active,
    )
}
