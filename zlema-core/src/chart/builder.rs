//! Turns a market-data payload plus the operator's toggles into a [`ChartSpec`].
//!
//! Pure: no I/O, no clock. Traces are emitted background first:
//! key levels, ribbons, zero-lag bands, median, polynomial forecast, the
//! efficiency / std-dev / RSI subplots, and the main candles on top.

use super::style::{level_color, palette, series_color, TraceStyle};
use super::trace::{bounds, ChartSpec, Panel, Trace, TraceCategory, TraceKind};
use crate::domain::{
    CandleSet, KeyLevels, MarketData, OverlaySettings, PolynomialPredictions, StrategyToggles,
    TradingParams, ZeroLagBands,
};

const EFFICIENCY_REFERENCES: [f64; 3] = [-1.0, 0.0, 1.0];
const EFFICIENCY_SPLIT: f64 = 0.0;
const RSI_REFERENCES: [f64; 3] = [30.0, 50.0, 70.0];
const RSI_SPLIT: f64 = 50.0;

/// Everything the chart depends on, borrowed from dashboard state.
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub market: &'a MarketData,
    pub key_levels: Option<&'a KeyLevels>,
    pub predictions: Option<&'a PolynomialPredictions>,
    pub overlays: &'a OverlaySettings,
    pub toggles: &'a StrategyToggles,
    pub params: &'a TradingParams,
}

pub fn build_chart(input: &ChartInput<'_>) -> ChartSpec {
    let market = input.market;
    let bars = market.bar_count();
    let x_end = bars.saturating_sub(1) as f64;
    let mut traces = Vec::new();

    if let Some(levels) = input.key_levels {
        push_key_levels(&mut traces, levels, input.overlays, x_end);
    }

    // Zero-lag mode replaces the ribbons, but only once the bands have arrived.
    let zero_lag = market.zl.as_ref().filter(|_| input.toggles.zero_lag);
    match zero_lag {
        Some(zl) => push_zero_lag(&mut traces, zl),
        None => {
            for (i, set) in market.all_candles.iter().enumerate().skip(1) {
                push_ribbon(&mut traces, set, i);
            }
        }
    }

    if !market.medians.is_empty() {
        traces.push(Trace::line(
            TraceCategory::Median,
            Panel::Price,
            "Median",
            bar_axis(market.medians.len()),
            nullable(&market.medians),
            TraceStyle::line(palette::MEDIAN, 2.0).dashed(),
        ));
    }

    if input.toggles.polynomial {
        if let Some(predictions) = input.predictions.filter(|p| !p.is_empty()) {
            push_polynomial(&mut traces, predictions, bars);
        }
    }

    push_oscillator(
        &mut traces,
        Oscillator {
            panel: Panel::Efficiency,
            series_category: TraceCategory::EfficiencySeries,
            average_category: TraceCategory::EfficiencyAverage,
            reference_category: TraceCategory::EfficiencyReference,
            label: "EFF",
            average_names: ("Average Efficiency (Positive)", "Average Efficiency (Negative)"),
            split: EFFICIENCY_SPLIT,
            references: &EFFICIENCY_REFERENCES,
        },
        &market.eff_data,
        x_end,
    );

    if !market.std_devs.is_empty() {
        traces.push(
            Trace::line(
                TraceCategory::StdDev,
                Panel::StdDev,
                "Std Dev",
                bar_axis(market.std_devs.len()),
                nullable(&market.std_devs),
                TraceStyle::line(palette::STD_DEV, 1.0),
            )
            .with_kind(TraceKind::Bars),
        );
    }

    push_oscillator(
        &mut traces,
        Oscillator {
            panel: Panel::Rsi,
            series_category: TraceCategory::RsiSeries,
            average_category: TraceCategory::RsiAverage,
            reference_category: TraceCategory::RsiReference,
            label: "RSI",
            average_names: ("Average RSI (Bullish)", "Average RSI (Bearish)"),
            split: RSI_SPLIT,
            references: &RSI_REFERENCES,
        },
        &market.rsi_data,
        x_end,
    );

    if let Some(primary) = market.primary().filter(|c| !c.is_empty()) {
        push_candles(&mut traces, primary);
    }

    let x_range = bounds(traces.iter().flat_map(|t| t.x.iter().copied())).unwrap_or((0.0, 0.0));

    ChartSpec {
        title: format!("{} - {}", input.params.pair, input.params.timeframe),
        traces,
        x_range,
    }
}

/// Split a series at `threshold`: values strictly above go left, the rest go
/// right. Each side keeps the full length with `None` where the other side has
/// the value.
pub fn split_by_threshold(
    values: &[Option<f64>],
    threshold: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    values
        .iter()
        .map(|v| match v {
            Some(x) if *x > threshold => (Some(*x), None),
            Some(x) => (None, Some(*x)),
            None => (None, None),
        })
        .unzip()
}

/// Per-bar mean across series, ignoring warm-up gaps. `None` where no series
/// has a value.
pub fn average_series(series: &[Vec<f64>]) -> Vec<Option<f64>> {
    let len = series.iter().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|i| {
            let (sum, count) = series
                .iter()
                .filter_map(|s| s.get(i).copied())
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

fn nullable(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

fn bar_axis(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64).collect()
}

fn push_key_levels(
    traces: &mut Vec<Trace>,
    levels: &KeyLevels,
    overlays: &OverlaySettings,
    x_end: f64,
) {
    for level in levels.levels.iter().filter(|l| overlays.shows(l.kind)) {
        traces.push(Trace::line(
            TraceCategory::KeyLevel(level.kind),
            Panel::Price,
            format!("{} {:.4}", level.kind.label(), level.price),
            vec![0.0, x_end],
            vec![Some(level.price), Some(level.price)],
            TraceStyle::line(level_color(level.kind), 1.0).dashed(),
        ));
    }
}

fn push_ribbon(traces: &mut Vec<Trace>, set: &CandleSet, window: usize) {
    let len = set.len();
    for i in 0..len.saturating_sub(1) {
        let bullish = set.is_bullish(i);
        let color = if bullish { palette::BULL } else { palette::BEAR };
        let lower = nullable(&set.open[i..i + 2]);
        traces.push(
            Trace::line(
                TraceCategory::Ribbon,
                Panel::Price,
                format!("Ribbon {window}"),
                vec![i as f64, (i + 1) as f64],
                nullable(&set.close[i..i + 2]),
                TraceStyle::line(color.with_alpha(palette::RIBBON_OPACITY), 0.0),
            )
            .with_kind(TraceKind::Band { lower, bullish }),
        );
    }
}

fn push_zero_lag(traces: &mut Vec<Trace>, zl: &ZeroLagBands) {
    let line = |name: &str, values: &[f64], style: TraceStyle| {
        Trace::line(
            TraceCategory::ZeroLag,
            Panel::Price,
            name,
            bar_axis(values.len()),
            nullable(values),
            style,
        )
    };
    traces.push(line("ZLEMA", &zl.zlema, TraceStyle::line(palette::ZLEMA, 2.0)));
    traces.push(line("Upper Band", &zl.upper_band, TraceStyle::line(palette::BAND, 1.0).dotted()));
    traces.push(line("Lower Band", &zl.lower_band, TraceStyle::line(palette::BAND, 1.0).dotted()));

    // Entry markers sit on the entry level, or on the ZLEMA when no level was sent.
    let markers = |name: &str, flags: &[bool], levels: &[f64], color| {
        let y = flags
            .iter()
            .enumerate()
            .map(|(i, &on)| {
                if !on {
                    return None;
                }
                let finite = |v: &f64| v.is_finite();
                levels
                    .get(i)
                    .copied()
                    .filter(finite)
                    .or_else(|| zl.zlema.get(i).copied().filter(finite))
            })
            .collect();
        Trace::line(
            TraceCategory::ZeroLag,
            Panel::Price,
            name,
            bar_axis(flags.len()),
            y,
            TraceStyle::line(color, 1.0),
        )
        .with_kind(TraceKind::Markers)
    };
    traces.push(markers("Bull Entry", &zl.bull_entry, &zl.bull_entry_level, palette::BULL));
    traces.push(markers("Bear Entry", &zl.bear_entry, &zl.bear_entry_level, palette::BEAR));
}

fn push_polynomial(traces: &mut Vec<Trace>, predictions: &PolynomialPredictions, bars: usize) {
    if !predictions.fitted.is_empty() {
        let start = bars.saturating_sub(predictions.fitted.len());
        traces.push(Trace::line(
            TraceCategory::Polynomial,
            Panel::Price,
            "Polynomial Fit",
            (start..start + predictions.fitted.len()).map(|i| i as f64).collect(),
            nullable(&predictions.fitted),
            TraceStyle::line(palette::POLYNOMIAL, 1.5),
        ));
    }
    if !predictions.predictions.is_empty() {
        traces.push(Trace::line(
            TraceCategory::Polynomial,
            Panel::Price,
            "Polynomial Forecast",
            (bars..bars + predictions.predictions.len()).map(|i| i as f64).collect(),
            nullable(&predictions.predictions),
            TraceStyle::line(palette::POLYNOMIAL, 2.0).dotted(),
        ));
    }
}

struct Oscillator {
    panel: Panel,
    series_category: TraceCategory,
    average_category: TraceCategory,
    reference_category: TraceCategory,
    label: &'static str,
    average_names: (&'static str, &'static str),
    split: f64,
    references: &'static [f64],
}

fn push_oscillator(traces: &mut Vec<Trace>, osc: Oscillator, series: &[Vec<f64>], x_end: f64) {
    if series.is_empty() {
        return;
    }
    for (i, values) in series.iter().enumerate() {
        traces.push(Trace::line(
            osc.series_category,
            osc.panel,
            format!("{} {}", osc.label, i + 1),
            bar_axis(values.len()),
            nullable(values),
            TraceStyle::line(series_color(i).with_alpha(0.5), 1.0),
        ));
    }

    let average = average_series(series);
    let x = bar_axis(average.len());
    let (above, below) = split_by_threshold(&average, osc.split);
    traces.push(Trace::line(
        osc.average_category,
        osc.panel,
        osc.average_names.0,
        x.clone(),
        above,
        TraceStyle::line(palette::AVERAGE_UP, 3.0),
    ));
    traces.push(Trace::line(
        osc.average_category,
        osc.panel,
        osc.average_names.1,
        x,
        below,
        TraceStyle::line(palette::AVERAGE_DOWN, 3.0),
    ));

    for &level in osc.references {
        traces.push(Trace::line(
            osc.reference_category,
            osc.panel,
            format!("{} {level}", osc.label),
            vec![0.0, x_end],
            vec![Some(level), Some(level)],
            TraceStyle::line(palette::REFERENCE, 1.0).dotted(),
        ));
    }
}

fn push_candles(traces: &mut Vec<Trace>, candles: &CandleSet) {
    let len = candles.len();
    let x = bar_axis(len);
    let close = nullable(&candles.close[..len]);
    traces.push(
        Trace::line(
            TraceCategory::Candles,
            Panel::Price,
            "Candles",
            x.clone(),
            close.clone(),
            TraceStyle::line(palette::BULL_BODY, palette::BODY_WIDTH).two_tone(palette::BEAR_BODY),
        )
        .with_kind(TraceKind::Candlestick {
            open: nullable(&candles.open[..len]),
            high: nullable(&candles.high[..len]),
            low: nullable(&candles.low[..len]),
        }),
    );
    traces.push(Trace::line(
        TraceCategory::CloseLine,
        Panel::Price,
        "Close",
        x,
        close,
        TraceStyle::line(palette::CLOSE, 1.0),
    ));
}
