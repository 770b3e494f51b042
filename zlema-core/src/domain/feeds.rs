//! Market-session clock and news feed payloads.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `GET /api/market-status` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketStatus {
    pub current_session: String,
    pub next_session: String,
    pub seconds_to_next: u64,
    pub timestamp: String,
    pub source: String,
}

impl MarketStatus {
    /// Seconds left until the next session, given how long ago this status was fetched.
    pub fn remaining(&self, elapsed: Duration) -> u64 {
        self.seconds_to_next.saturating_sub(elapsed.as_secs())
    }

    /// `HH:MM:SS` countdown to the next session.
    pub fn countdown(&self, elapsed: Duration) -> String {
        format_countdown(self.remaining(elapsed))
    }
}

pub fn format_countdown(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Model-assigned impact of a headline on the selected pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsAnalysis {
    /// `BULLISH`, `BEARISH` or `NEUTRAL`.
    pub impact: String,
    pub reasoning: String,
    /// `HIGH`, `MEDIUM` or `LOW`.
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub published: String,
    pub source: String,
    pub analysis: Option<NewsAnalysis>,
}

impl NewsItem {
    pub fn impact(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.impact.as_str())
    }
}

/// `GET /api/news` response, already sorted by relevance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsFeed {
    pub news_items: Vec<NewsItem>,
    pub currency_pair: String,
    pub enable_ai_analysis: bool,
    pub timestamp: String,
}
