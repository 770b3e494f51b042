//! Operator-selected trading, polynomial and strategy parameters.
//!
//! The only local validation is range clamping: every picker cycles through a
//! fixed option list and every slider is clamped to its bounds on mutation.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency pairs offered by the pair picker.
pub const PAIRS: [&str; 7] = [
    "GBP_USD", "EUR_USD", "USD_JPY", "USD_CHF", "AUD_USD", "USD_CAD", "NZD_USD",
];

/// Bar counts offered by the periods picker.
pub const PERIOD_OPTIONS: [u32; 5] = [24, 48, 96, 192, 384];

/// Zero-lag lengths offered by the ZLEMA length picker.
pub const ZL_LENGTH_OPTIONS: [u32; 17] = [
    10, 12, 15, 20, 24, 30, 36, 40, 48, 50, 60, 70, 80, 100, 120, 150, 200,
];

/// Indicator windows the backend computes RSI/efficiency series for.
pub const DEFAULT_WINDOW_LENGTHS: [u32; 5] = [3, 12, 24, 36, 48];

pub const MIN_UNITS: u32 = 10_000;
pub const MAX_UNITS: u32 = 100_000;
pub const UNIT_STEP: u32 = 10_000;

pub const LOOKBACK_RANGE: RangeInclusive<u32> = 5..=50;
pub const LOOKBACK_STEP: u32 = 5;
pub const FORECAST_RANGE: RangeInclusive<u32> = 3..=15;
pub const DEGREE_RANGE: RangeInclusive<u32> = 1..=5;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown timeframe '{0}' (expected one of M1, M5, M15, M30, H1, H4, D1)")]
pub struct ParseTimeframeError(pub String);

/// Candle granularity requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        }
    }

    pub fn next(self) -> Timeframe {
        cycle(&Self::ALL, &self, true)
    }

    pub fn prev(self) -> Timeframe {
        cycle(&Self::ALL, &self, false)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == upper)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

/// Which signal family the backend should compute the market-data payload with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    #[default]
    Classic,
    ZeroLag,
}

impl StrategyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyMode::Classic => "classic",
            StrategyMode::ZeroLag => "zero_lag",
        }
    }
}

/// Parameters that shape every market-data and key-level request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingParams {
    pub pair: String,
    pub timeframe: Timeframe,
    pub periods: u32,
    /// Order size in units.
    pub units: u32,
    pub window_lengths: Vec<u32>,
    pub strategy: StrategyMode,
    pub zl_length: u32,
    /// Rolling window the backend uses for key-level detection.
    pub key_level_window: u32,
    /// Minimum relative distance between detected levels.
    pub volatility_threshold: f64,
}

impl Default for TradingParams {
    fn default() -> Self {
        Self {
            pair: PAIRS[0].to_string(),
            timeframe: Timeframe::M5,
            periods: 48,
            units: MIN_UNITS,
            window_lengths: DEFAULT_WINDOW_LENGTHS.to_vec(),
            strategy: StrategyMode::Classic,
            zl_length: 70,
            key_level_window: 20,
            volatility_threshold: 0.001,
        }
    }
}

impl TradingParams {
    pub fn cycle_pair(&mut self, forward: bool) {
        let idx = PAIRS.iter().position(|p| *p == self.pair);
        let next = match idx {
            Some(i) if forward => (i + 1) % PAIRS.len(),
            Some(i) => (i + PAIRS.len() - 1) % PAIRS.len(),
            None => 0,
        };
        self.pair = PAIRS[next].to_string();
    }

    pub fn cycle_timeframe(&mut self, forward: bool) {
        self.timeframe = cycle(&Timeframe::ALL, &self.timeframe, forward);
    }

    pub fn cycle_periods(&mut self, forward: bool) {
        self.periods = cycle(&PERIOD_OPTIONS, &self.periods, forward);
    }

    pub fn cycle_zl_length(&mut self, forward: bool) {
        self.zl_length = cycle(&ZL_LENGTH_OPTIONS, &self.zl_length, forward);
    }

    /// Set the order size, clamped to the picker range and snapped to its step.
    pub fn set_units(&mut self, units: u32) {
        let clamped = units.clamp(MIN_UNITS, MAX_UNITS);
        let snapped = ((clamped + UNIT_STEP / 2) / UNIT_STEP) * UNIT_STEP;
        self.units = snapped.clamp(MIN_UNITS, MAX_UNITS);
    }

    pub fn step_units(&mut self, forward: bool) {
        let next = if forward {
            self.units.saturating_add(UNIT_STEP)
        } else {
            self.units.saturating_sub(UNIT_STEP)
        };
        self.set_units(next);
    }

    /// `window_lengths` as the backend expects it: comma-separated.
    pub fn window_lengths_param(&self) -> String {
        self.window_lengths
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query for `GET /api/market-data`.
    pub fn market_data_query(&self) -> Vec<(String, String)> {
        vec![
            ("pair".into(), self.pair.clone()),
            ("timeframe".into(), self.timeframe.to_string()),
            ("periods".into(), self.periods.to_string()),
            ("window_lengths".into(), self.window_lengths_param()),
            ("strategy".into(), self.strategy.as_str().into()),
            ("zl_length".into(), self.zl_length.to_string()),
        ]
    }

    /// Query for `GET /api/key-levels`.
    pub fn key_levels_query(&self) -> Vec<(String, String)> {
        vec![
            ("pair".into(), self.pair.clone()),
            ("timeframe".into(), self.timeframe.to_string()),
            ("periods".into(), self.periods.to_string()),
            ("window".into(), self.key_level_window.to_string()),
            ("threshold".into(), self.volatility_threshold.to_string()),
        ]
    }

    /// A pair or timeframe switch invalidates every cached response.
    pub fn requires_cache_reset(&self, previous: &TradingParams) -> bool {
        self.pair != previous.pair || self.timeframe != previous.timeframe
    }

    /// True when the fields that shape backend requests differ.
    ///
    /// The order size only matters when a trade is submitted.
    pub fn affects_requests(&self, previous: &TradingParams) -> bool {
        self.pair != previous.pair
            || self.timeframe != previous.timeframe
            || self.periods != previous.periods
            || self.window_lengths != previous.window_lengths
            || self.strategy != previous.strategy
            || self.zl_length != previous.zl_length
            || self.key_level_window != previous.key_level_window
            || self.volatility_threshold != previous.volatility_threshold
    }
}

/// Polynomial-regression forecast settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolynomialParams {
    pub lookback: u32,
    pub forecast_periods: u32,
    pub degree: u32,
}

impl Default for PolynomialParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            forecast_periods: 5,
            degree: 2,
        }
    }
}

impl PolynomialParams {
    /// Clamp every field into its slider range.
    pub fn clamped(self) -> Self {
        Self {
            lookback: clamp_range(self.lookback, &LOOKBACK_RANGE),
            forecast_periods: clamp_range(self.forecast_periods, &FORECAST_RANGE),
            degree: clamp_range(self.degree, &DEGREE_RANGE),
        }
    }

    pub fn adjust_lookback(&mut self, delta: i32) {
        self.lookback = step_clamped(self.lookback, delta * LOOKBACK_STEP as i32, &LOOKBACK_RANGE);
    }

    pub fn adjust_forecast(&mut self, delta: i32) {
        self.forecast_periods = step_clamped(self.forecast_periods, delta, &FORECAST_RANGE);
    }

    pub fn adjust_degree(&mut self, delta: i32) {
        self.degree = step_clamped(self.degree, delta, &DEGREE_RANGE);
    }

    /// Query for `GET /api/polynomial-predictions`.
    pub fn query(&self, params: &TradingParams) -> Vec<(String, String)> {
        vec![
            ("pair".into(), params.pair.clone()),
            ("timeframe".into(), params.timeframe.to_string()),
            ("periods".into(), params.periods.to_string()),
            ("lookback".into(), self.lookback.to_string()),
            ("forecast_periods".into(), self.forecast_periods.to_string()),
            ("degree".into(), self.degree.to_string()),
        ]
    }
}

/// Which indicator families are switched on in the strategy tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyToggles {
    pub zlema1: bool,
    pub zero_lag: bool,
    pub polynomial: bool,
}

impl Default for StrategyToggles {
    fn default() -> Self {
        Self {
            zlema1: true,
            zero_lag: false,
            polynomial: false,
        }
    }
}

impl StrategyToggles {
    /// Toggle zero-lag mode and keep the request strategy in sync.
    pub fn toggle_zero_lag(&mut self, params: &mut TradingParams) {
        self.zero_lag = !self.zero_lag;
        params.strategy = self.strategy_mode();
    }

    pub fn strategy_mode(&self) -> StrategyMode {
        if self.zero_lag {
            StrategyMode::ZeroLag
        } else {
            StrategyMode::Classic
        }
    }
}

/// Step through `options`, wrapping at both ends. Unknown values restart at the first option.
fn cycle<T: PartialEq + Copy>(options: &[T], current: &T, forward: bool) -> T {
    let len = options.len();
    match options.iter().position(|o| o == current) {
        Some(i) if forward => options[(i + 1) % len],
        Some(i) => options[(i + len - 1) % len],
        None => options[0],
    }
}

fn clamp_range(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn step_clamped(value: u32, delta: i32, range: &RangeInclusive<u32>) -> u32 {
    let next = (value as i64 + delta as i64).max(0) as u32;
    clamp_range(next, range)
}
