//! Key-levels payload.

use serde::{Deserialize, Serialize};

use super::overlays::LevelKind;

/// One horizontal price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: LevelKind,
    #[serde(default)]
    pub confidence: f64,
}

/// Clustered levels. The backend also ships the per-method breakdowns; only
/// the merged list is drawn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLevels {
    pub levels: Vec<KeyLevel>,
}

impl KeyLevels {
    pub fn of_kind(&self, kind: LevelKind) -> impl Iterator<Item = &KeyLevel> + '_ {
        self.levels.iter().filter(move |l| l.kind == kind)
    }
}

/// `GET /api/key-levels` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLevelsResponse {
    pub key_levels: KeyLevels,
    pub pair: String,
    pub timeframe: String,
    pub periods: u32,
    pub window: u32,
    pub threshold: f64,
    pub timestamp: String,
}
