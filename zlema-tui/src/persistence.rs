//! App state persistence: JSON save/load across restarts.
//!
//! Only operator choices survive a restart; backend data is always refetched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use zlema_core::domain::{OverlaySettings, PolynomialParams, StrategyToggles, TradingParams};

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state. Missing fields keep the configured defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub params: Option<TradingParams>,
    pub polynomial: Option<PolynomialParams>,
    pub toggles: Option<StrategyToggles>,
    pub overlays: Option<OverlaySettings>,
    pub news_ai: Option<bool>,
    pub active_panel: Option<Panel>,
    pub welcome_dismissed: bool,
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        params: Some(app.request.params.clone()),
        polynomial: Some(app.request.polynomial),
        toggles: Some(app.request.toggles),
        overlays: Some(app.overlays),
        news_ai: Some(app.news_ai),
        active_panel: Some(app.active_panel),
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state, re-clamping values a hand-edited file may have broken.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Some(mut params) = state.params {
        let units = params.units;
        params.set_units(units);
        app.request.params = params;
    }
    if let Some(poly) = state.polynomial {
        app.request.polynomial = poly.clamped();
    }
    if let Some(toggles) = state.toggles {
        app.request.toggles = toggles;
    }
    app.request.params.strategy = app.request.toggles.strategy_mode();
    if let Some(overlays) = state.overlays {
        app.overlays = overlays;
    }
    if let Some(news_ai) = state.news_ai {
        app.news_ai = news_ai;
    }
    if let Some(panel) = state.active_panel {
        app.active_panel = panel;
    }
    if state.welcome_dismissed {
        app.overlay = Overlay::None;
    }
    // Restored parameters are the baseline, not an edit.
    app.watcher = zlema_core::dashboard::ParamsWatcher::new(app.request.clone());
}
