//! Order submission and open-position payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "LONG" => Ok(Direction::Buy),
            "SELL" | "SHORT" => Ok(Direction::Sell),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// `POST /api/trade` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub pair: String,
    pub size: u32,
    pub direction: Direction,
}

/// `POST /api/trade` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeResponse {
    pub status: String,
    pub trade_id: String,
    pub price: f64,
    pub mode: String,
}

/// An open position as listed by `GET /api/trades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTrade {
    #[serde(deserialize_with = "string_or_number")]
    pub trade_id: String,
    pub pair: String,
    pub direction: Direction,
    pub size: f64,
    pub entry_price: f64,
    /// Running profit in pips.
    #[serde(default)]
    pub current_pl: f64,
    #[serde(default)]
    pub practice_mode: Option<bool>,
}

/// `GET /api/trades` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradesResponse {
    pub open_trades: Vec<OpenTrade>,
    pub profit_history: Vec<f64>,
}

impl TradesResponse {
    /// Sum of running profit over all open positions, in pips.
    pub fn open_pl(&self) -> f64 {
        self.open_trades.iter().map(|t| t.current_pl).sum()
    }
}

/// `POST /api/trade/{id}/close` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseTradeResponse {
    pub status: String,
    pub profit: f64,
}

/// `POST /api/trades/close-all` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseAllResponse {
    pub status: String,
    pub closed_trades: u32,
    pub total_profit: f64,
}

/// Trade ids are strings for live brokers and integers for the simulator.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "trade_id must be a string or number, got {other}"
        ))),
    }
}
