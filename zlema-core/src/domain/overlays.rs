//! Key-level overlay visibility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of price level reported by the key-levels endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
    Volume,
    Fibonacci,
    Pivots,
}

impl LevelKind {
    pub const ALL: [LevelKind; 5] = [
        LevelKind::Support,
        LevelKind::Resistance,
        LevelKind::Volume,
        LevelKind::Fibonacci,
        LevelKind::Pivots,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LevelKind::Support => "Support",
            LevelKind::Resistance => "Resistance",
            LevelKind::Volume => "Volume",
            LevelKind::Fibonacci => "Fibonacci",
            LevelKind::Pivots => "Pivots",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which key-level kinds are drawn on the price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub support: bool,
    pub resistance: bool,
    pub volume: bool,
    pub fibonacci: bool,
    pub pivots: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            support: true,
            resistance: true,
            volume: false,
            fibonacci: false,
            pivots: false,
        }
    }
}

impl OverlaySettings {
    pub fn shows(&self, kind: LevelKind) -> bool {
        match kind {
            LevelKind::Support => self.support,
            LevelKind::Resistance => self.resistance,
            LevelKind::Volume => self.volume,
            LevelKind::Fibonacci => self.fibonacci,
            LevelKind::Pivots => self.pivots,
        }
    }

    pub fn toggle(&mut self, kind: LevelKind) {
        let flag = match kind {
            LevelKind::Support => &mut self.support,
            LevelKind::Resistance => &mut self.resistance,
            LevelKind::Volume => &mut self.volume,
            LevelKind::Fibonacci => &mut self.fibonacci,
            LevelKind::Pivots => &mut self.pivots,
        };
        *flag = !*flag;
    }

    pub fn visible_kinds(&self) -> impl Iterator<Item = LevelKind> + '_ {
        LevelKind::ALL.into_iter().filter(|k| self.shows(*k))
    }
}
