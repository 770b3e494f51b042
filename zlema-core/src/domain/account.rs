//! Account status and broker connection payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Broker account the backend routes orders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountMode {
    /// Broker demo account.
    #[default]
    Test,
    /// Local simulation with no broker.
    Practice,
    Live,
    #[serde(other)]
    Unknown,
}

impl AccountMode {
    pub const SELECTABLE: [AccountMode; 3] =
        [AccountMode::Test, AccountMode::Practice, AccountMode::Live];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountMode::Test => "test",
            AccountMode::Practice => "practice",
            AccountMode::Live => "live",
            AccountMode::Unknown => "unknown",
        }
    }

    pub fn next(self) -> AccountMode {
        match self {
            AccountMode::Test => AccountMode::Practice,
            AccountMode::Practice => AccountMode::Live,
            AccountMode::Live | AccountMode::Unknown => AccountMode::Test,
        }
    }
}

impl fmt::Display for AccountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SELECTABLE
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown account mode '{s}' (expected test, practice or live)"))
    }
}

/// `GET /api/status` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountStatus {
    pub account_mode: AccountMode,
    /// Absent in practice mode.
    pub account_balance: Option<f64>,
    pub open_trades_count: u32,
    /// Cumulative realised profit in pips.
    pub total_profit: f64,
    /// Last 50 realised trade results.
    pub profit_history: Vec<f64>,
    pub total_trades: u32,
    pub trading_stats: serde_json::Map<String, serde_json::Value>,
}

impl AccountStatus {
    /// Share of winning trades in the recent history, if any trades closed.
    pub fn win_rate(&self) -> Option<f64> {
        if self.profit_history.is_empty() {
            return None;
        }
        let wins = self.profit_history.iter().filter(|p| **p > 0.0).count();
        Some(wins as f64 / self.profit_history.len() as f64)
    }

    /// Running sum of `profit_history`, for the equity sparkline.
    pub fn cumulative_profit(&self) -> Vec<f64> {
        self.profit_history
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }
}

/// `POST /api/connect` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectResponse {
    pub status: String,
    pub mode: AccountMode,
}
