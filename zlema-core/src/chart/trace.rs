//! Renderer-agnostic chart description.

use super::style::TraceStyle;
use crate::domain::LevelKind;

/// Stacked subplots sharing the bar axis, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Price,
    Efficiency,
    StdDev,
    Rsi,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Price, Panel::Efficiency, Panel::StdDev, Panel::Rsi];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Price => "Price (pips)",
            Panel::Efficiency => "Efficiency",
            Panel::StdDev => "Std Dev",
            Panel::Rsi => "RSI",
        }
    }

    /// Fixed y range, or `None` to fit the data.
    pub fn y_range(self) -> Option<(f64, f64)> {
        match self {
            Panel::Efficiency => Some((-1.2, 1.2)),
            Panel::Rsi => Some((0.0, 100.0)),
            Panel::Price | Panel::StdDev => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceCategory {
    KeyLevel(LevelKind),
    Ribbon,
    ZeroLag,
    Median,
    Polynomial,
    EfficiencySeries,
    EfficiencyAverage,
    EfficiencyReference,
    StdDev,
    RsiSeries,
    RsiAverage,
    RsiReference,
    Candles,
    CloseLine,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceKind {
    Line,
    /// Filled region between `lower` and the trace's `y`.
    Band {
        lower: Vec<Option<f64>>,
        bullish: bool,
    },
    Bars,
    /// Points only; gaps are `None`.
    Markers,
    /// OHLC bars; the trace's `y` carries the close.
    Candlestick {
        open: Vec<Option<f64>>,
        high: Vec<Option<f64>>,
        low: Vec<Option<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub category: TraceCategory,
    pub panel: Panel,
    pub kind: TraceKind,
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
    pub style: TraceStyle,
}

impl Trace {
    pub fn line(
        category: TraceCategory,
        panel: Panel,
        name: impl Into<String>,
        x: Vec<f64>,
        y: Vec<Option<f64>>,
        style: TraceStyle,
    ) -> Self {
        Self {
            category,
            panel,
            kind: TraceKind::Line,
            name: name.into(),
            x,
            y,
            style,
        }
    }

    pub fn with_kind(mut self, kind: TraceKind) -> Self {
        self.kind = kind;
        self
    }

    /// `(x, y)` pairs with gaps removed, the shape terminal plotters want.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(&x, y)| y.map(|y| (x, y)))
            .collect()
    }

    /// Finite `(min, max)` over `y` and any band or candle columns.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let extra: Vec<&Vec<Option<f64>>> = match &self.kind {
            TraceKind::Band { lower, .. } => vec![lower],
            TraceKind::Candlestick { high, low, .. } => vec![high, low],
            _ => Vec::new(),
        };
        let values = self
            .y
            .iter()
            .chain(extra.into_iter().flatten())
            .filter_map(|v| *v);
        bounds(values)
    }
}

pub(crate) fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// A complete chart: traces in draw order, background first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSpec {
    pub title: String,
    pub traces: Vec<Trace>,
    /// Shared x range across panels.
    pub x_range: (f64, f64),
}

impl ChartSpec {
    /// Categories present, in first-drawn order, without repeats.
    pub fn categories(&self) -> Vec<TraceCategory> {
        let mut seen = Vec::new();
        for trace in &self.traces {
            if !seen.contains(&trace.category) {
                seen.push(trace.category);
            }
        }
        seen
    }

    pub fn has(&self, category: TraceCategory) -> bool {
        self.traces.iter().any(|t| t.category == category)
    }

    pub fn of_category(&self, category: TraceCategory) -> impl Iterator<Item = &Trace> + '_ {
        self.traces.iter().filter(move |t| t.category == category)
    }

    pub fn in_panel(&self, panel: Panel) -> impl Iterator<Item = &Trace> + '_ {
        self.traces.iter().filter(move |t| t.panel == panel)
    }

    /// The panel's fixed range, else the data bounds across its traces.
    pub fn y_range(&self, panel: Panel) -> Option<(f64, f64)> {
        panel.y_range().or_else(|| {
            self.in_panel(panel)
                .filter_map(Trace::y_bounds)
                .fold(None, |acc, (lo, hi)| match acc {
                    None => Some((lo, hi)),
                    Some((a, b)) => Some((a.min(lo), b.max(hi))),
                })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}
