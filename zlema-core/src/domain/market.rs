//! Market-data payload: candle sets, indicator series and optional zero-lag bands.
//!
//! Prices arrive already rescaled to pips around the window mean. Indicator
//! warm-up bars are sent as `null`; they decode to `NaN` so every series keeps
//! its bar alignment.

use serde::{Deserialize, Deserializer, Serialize};

/// One OHLC(V) series as emitted by the backend: rows `[open, close, high, low, volume?]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<Option<f64>>>", into = "Vec<Vec<Option<f64>>>")]
pub struct CandleSet {
    pub open: Vec<f64>,
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub volume: Option<Vec<f64>>,
}

impl CandleSet {
    /// Number of complete bars (the shortest of the four price rows).
    pub fn len(&self) -> usize {
        self.open
            .len()
            .min(self.close.len())
            .min(self.high.len())
            .min(self.low.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A bar is bullish when it closes at or above its open.
    pub fn is_bullish(&self, i: usize) -> bool {
        self.close[i] >= self.open[i]
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.get(..self.len())?.last().copied().filter(|c| c.is_finite())
    }
}

impl From<Vec<Vec<Option<f64>>>> for CandleSet {
    fn from(rows: Vec<Vec<Option<f64>>>) -> Self {
        let mut rows = rows.into_iter().map(|row| {
            row.into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect::<Vec<f64>>()
        });
        Self {
            open: rows.next().unwrap_or_default(),
            close: rows.next().unwrap_or_default(),
            high: rows.next().unwrap_or_default(),
            low: rows.next().unwrap_or_default(),
            volume: rows.next(),
        }
    }
}

impl From<CandleSet> for Vec<Vec<Option<f64>>> {
    fn from(set: CandleSet) -> Self {
        let encode = |row: Vec<f64>| -> Vec<Option<f64>> {
            row.into_iter().map(|v| v.is_finite().then_some(v)).collect()
        };
        let mut rows = vec![
            encode(set.open),
            encode(set.close),
            encode(set.high),
            encode(set.low),
        ];
        if let Some(volume) = set.volume {
            rows.push(encode(volume));
        }
        rows
    }
}

/// Zero-lag trend signals, present when the request asked for `strategy=zero_lag`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroLagBands {
    #[serde(deserialize_with = "nullable_series")]
    pub zlema: Vec<f64>,
    #[serde(deserialize_with = "nullable_series")]
    pub upper_band: Vec<f64>,
    #[serde(deserialize_with = "nullable_series")]
    pub lower_band: Vec<f64>,
    /// +1 in an uptrend, -1 in a downtrend.
    #[serde(deserialize_with = "nullable_series")]
    pub trend: Vec<f64>,
    pub bull_entry: Vec<bool>,
    pub bear_entry: Vec<bool>,
    #[serde(deserialize_with = "nullable_series")]
    pub bull_entry_level: Vec<f64>,
    #[serde(deserialize_with = "nullable_series")]
    pub bear_entry_level: Vec<f64>,
    pub trend_up_signal: Vec<bool>,
    pub trend_down_signal: Vec<bool>,
    #[serde(deserialize_with = "nullable_series")]
    pub trend_up_level: Vec<f64>,
    #[serde(deserialize_with = "nullable_series")]
    pub trend_down_level: Vec<f64>,
}

/// `GET /api/market-data` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketData {
    /// Raw candles first, then one smoothed set per requested window.
    pub all_candles: Vec<CandleSet>,
    #[serde(deserialize_with = "nullable_series_list")]
    pub eff_data: Vec<Vec<f64>>,
    #[serde(deserialize_with = "nullable_series")]
    pub std_devs: Vec<f64>,
    #[serde(deserialize_with = "nullable_series")]
    pub medians: Vec<f64>,
    #[serde(deserialize_with = "nullable_series_list")]
    pub rsi_data: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zl: Option<ZeroLagBands>,
    pub pair: String,
    pub timeframe: String,
    pub periods: u32,
    pub timestamp: String,
}

impl MarketData {
    /// The raw (unsmoothed) candle set.
    pub fn primary(&self) -> Option<&CandleSet> {
        self.all_candles.first()
    }

    /// Last close of the raw candle set.
    pub fn current_price(&self) -> Option<f64> {
        self.primary().and_then(CandleSet::last_close)
    }

    /// Bar count of the raw candle set.
    pub fn bar_count(&self) -> usize {
        self.primary().map_or(0, CandleSet::len)
    }
}

fn nullable_series<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn nullable_series_list<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Vec<Option<f64>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|series| series.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}
