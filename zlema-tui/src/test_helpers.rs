//! Test helpers for building app state and canned backend data

use std::sync::mpsc::{self, Receiver, Sender};

use zlema_core::config::DashboardConfig;
use zlema_core::dashboard::{RefreshBatch, RefreshScope};
use zlema_core::domain::{Direction, OpenTrade, TradesResponse, TradingParams};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

/// App wired to channels the test holds the other ends of.
pub fn test_app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let app = AppState::new(cmd_tx, resp_rx, &DashboardConfig::default());
    (app, cmd_rx, resp_tx)
}

pub fn open_trade(id: &str) -> OpenTrade {
    OpenTrade {
        trade_id: id.to_string(),
        pair: "GBP_USD".into(),
        direction: Direction::Buy,
        size: 10_000.0,
        entry_price: 1.2710,
        current_pl: 4.5,
        practice_mode: Some(true),
    }
}

pub fn trades_batch(open_trades: Vec<OpenTrade>) -> RefreshBatch {
    let mut batch = RefreshBatch::new(RefreshScope::Trading, TradingParams::default());
    batch.trades = Some(Ok(Some(TradesResponse {
        open_trades,
        profit_history: Vec::new(),
    })));
    batch
}
