//! ZLEMA Trader TUI: terminal dashboard for a remote forex strategy backend.
//!
//! Panels:
//! 1. Chart: candles, key levels, ribbons or zero-lag bands, oscillators
//! 2. Trades: open positions, close selected
//! 3. Strategy: indicator toggles and polynomial forecast sliders
//! 4. Account: balance, profit curve, broker connection
//! 5. News: headlines with optional AI impact tags
//! 6. Help: keyboard shortcuts
//!
//! The order sidebar (pair, timeframe, periods, units, BUY/SELL) is always visible.

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

#[cfg(test)]
mod test_helpers;
