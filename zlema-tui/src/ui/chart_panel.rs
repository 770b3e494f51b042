//! Chart panel: price with key levels, ribbons or zero-lag bands, then
//! efficiency, std-dev and RSI subplots on a shared bar axis.
//!
//! Traces come from [`build_chart`] in draw order; each one is painted onto a
//! braille canvas. Line widths are ignored; dash styles are approximated by
//! skipping pieces of each segment.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use zlema_core::chart::{build_chart, ChartInput, ChartSpec, Dash, Panel, Trace, TraceKind};

use crate::app::AppState;
use crate::theme::{self, Theme};

/// Dash pieces across the full x range.
const DASH_RESOLUTION: f64 = 60.0;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let dashboard = &app.dashboard;
    let Some(market) = dashboard.market_data.as_ref().filter(|m| m.bar_count() > 0) else {
        render_empty(f, area, dashboard.is_initial_load);
        return;
    };

    let spec = build_chart(&ChartInput {
        market,
        key_levels: dashboard.key_levels.as_ref().map(|k| &k.key_levels),
        predictions: dashboard.predictions.as_ref(),
        overlays: &app.overlays,
        toggles: &app.request.toggles,
        params: &app.request.params,
    });
    render_spec(f, area, &spec);
}

fn render_empty(f: &mut Frame, area: Rect, loading: bool) {
    let msg = if loading {
        "Loading market data..."
    } else {
        "No market data for this pair and timeframe."
    };
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(msg, theme::muted())),
        Line::from(""),
        Line::from(Span::styled(
            "Change the pair with p or the timeframe with t; R refreshes.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Draw a built chart: a title row, then the four stacked subplots.
pub fn render_spec(f: &mut Frame, area: Rect, spec: &ChartSpec) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(52),
            Constraint::Percentage(16),
            Constraint::Percentage(13),
            Constraint::Percentage(19),
        ])
        .split(area);

    let title = Line::from(vec![
        Span::styled(format!(" {} ", spec.title), theme::accent_bold()),
        Span::styled(
            format!("{} traces  [s/r/v/f/o]levels [z]zero-lag [y]poly", spec.traces.len()),
            theme::muted(),
        ),
    ]);
    f.render_widget(Paragraph::new(title), chunks[0]);

    for (panel, area) in Panel::ALL.into_iter().zip(chunks.iter().skip(1)) {
        render_subplot(f, *area, spec, panel);
    }
}

fn render_subplot(f: &mut Frame, area: Rect, spec: &ChartSpec, panel: Panel) {
    let traces: Vec<&Trace> = spec.in_panel(panel).collect();
    let y_range = if traces.is_empty() {
        None
    } else {
        spec.y_range(panel).map(padded)
    };
    let Some((y_min, y_max)) = y_range else {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(theme::muted())
            .title(Span::styled(format!(" {} [no data] ", panel.label()), theme::muted()));
        f.render_widget(block, area);
        return;
    };

    let (x_min, x_max) = spec.x_range;
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
    let x_span = x_max - x_min;

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme::muted())
        .title(Span::styled(
            format!(" {}  {y_min:.1} .. {y_max:.1} ", panel.label()),
            theme::muted(),
        ));

    let palette = Theme::default();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(palette.background)
        .x_bounds([x_min - 0.5, x_max + 0.5])
        .y_bounds([y_min, y_max])
        .paint(move |ctx| {
            let mut previous = None;
            for trace in &traces {
                if previous.is_some_and(|c| c != trace.category) {
                    ctx.layer();
                }
                previous = Some(trace.category);
                draw_trace(ctx, trace, &palette, x_span, y_min);
            }
        });
    f.render_widget(canvas, area);
}

fn draw_trace(ctx: &mut Context, trace: &Trace, palette: &Theme, x_span: f64, y_floor: f64) {
    let color = palette.trace_color(trace.style.color);
    match &trace.kind {
        TraceKind::Line => {
            for (x1, y1, x2, y2) in dashed(&segments(trace), trace.style.dash, x_span) {
                ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
            }
        }
        TraceKind::Band { lower, .. } => {
            for ((x, top), bottom) in columns(trace, lower) {
                ctx.draw(&CanvasLine { x1: x, y1: bottom, x2: x, y2: top, color });
            }
        }
        TraceKind::Bars => {
            let base = 0.0_f64.max(y_floor);
            for (x, y) in trace.points() {
                ctx.draw(&CanvasLine { x1: x, y1: base, x2: x, y2: y, color });
            }
        }
        TraceKind::Markers => {
            let coords = trace.points();
            ctx.draw(&Points { coords: &coords, color });
        }
        TraceKind::Candlestick { open, high, low } => {
            let down = palette.trace_color(trace.style.down_color.unwrap_or(trace.style.color));
            let half = trace.style.width / 2.0;
            for (i, &x) in trace.x.iter().enumerate() {
                let (Some(o), Some(c), Some(h), Some(l)) = (
                    open.get(i).copied().flatten(),
                    trace.y.get(i).copied().flatten(),
                    high.get(i).copied().flatten(),
                    low.get(i).copied().flatten(),
                ) else {
                    continue;
                };
                let body = if c >= o { color } else { down };
                ctx.draw(&CanvasLine { x1: x, y1: l, x2: x, y2: h, color: body });
                for dx in [-half, -half / 2.0, half / 2.0, half] {
                    ctx.draw(&CanvasLine {
                        x1: x + dx,
                        y1: o,
                        x2: x + dx,
                        y2: c,
                        color: body,
                    });
                }
            }
        }
    }
}

/// Widen a range by 5% each side; a flat range gets ±1.
pub fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo - span * 0.05, hi + span * 0.05)
    }
}

/// Straight segments between consecutive present points; gaps break the line.
pub fn segments(trace: &Trace) -> Vec<(f64, f64, f64, f64)> {
    let mut out = Vec::new();
    let mut prev: Option<(f64, f64)> = None;
    for (&x, y) in trace.x.iter().zip(&trace.y) {
        match (prev, y.filter(|v| v.is_finite())) {
            (Some((px, py)), Some(y)) => {
                out.push((px, py, x, y));
                prev = Some((x, y));
            }
            (None, Some(y)) => prev = Some((x, y)),
            (_, None) => prev = None,
        }
    }
    out
}

/// Split segments into pieces and keep every other (dashed) or every third (dotted).
pub fn dashed(
    segments: &[(f64, f64, f64, f64)],
    dash: Dash,
    x_span: f64,
) -> Vec<(f64, f64, f64, f64)> {
    let keep_every = match dash {
        Dash::Solid => return segments.to_vec(),
        Dash::Dashed => 2,
        Dash::Dotted => 3,
    };
    let mut out = Vec::new();
    for &(x1, y1, x2, y2) in segments {
        let pieces = (((x2 - x1).abs() / x_span.max(f64::EPSILON)) * DASH_RESOLUTION)
            .ceil()
            .max(1.0) as usize;
        let pieces = pieces * keep_every;
        for i in (0..pieces).step_by(keep_every) {
            let t0 = i as f64 / pieces as f64;
            let t1 = (i + 1) as f64 / pieces as f64;
            out.push((
                x1 + (x2 - x1) * t0,
                y1 + (y2 - y1) * t0,
                x1 + (x2 - x1) * t1,
                y1 + (y2 - y1) * t1,
            ));
        }
    }
    out
}

/// Vertical fill columns for a band: `((x, top), bottom)` at a few steps per segment.
fn columns(trace: &Trace, lower: &[Option<f64>]) -> Vec<((f64, f64), f64)> {
    const STEPS: usize = 4;
    let mut out = Vec::new();
    for i in 0..trace.x.len().saturating_sub(1) {
        let (Some(t0), Some(t1), Some(b0), Some(b1)) = (
            trace.y.get(i).copied().flatten(),
            trace.y.get(i + 1).copied().flatten(),
            lower.get(i).copied().flatten(),
            lower.get(i + 1).copied().flatten(),
        ) else {
            continue;
        };
        let (x0, x1) = (trace.x[i], trace.x[i + 1]);
        for s in 0..=STEPS {
            let t = s as f64 / STEPS as f64;
            out.push((
                (x0 + (x1 - x0) * t, t0 + (t1 - t0) * t),
                b0 + (b1 - b0) * t,
            ));
        }
    }
    out
}
