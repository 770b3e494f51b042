//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. Backend calls happen on the worker thread; the
//! main loop calls [`AppState::tick`] to dispatch due polls and
//! [`AppState::handle_response`] to merge what comes back.

use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use zlema_core::config::DashboardConfig;
use zlema_core::dashboard::{
    DashboardRequest, DashboardState, Job, ParamChange, ParamsWatcher, RefreshScope, Schedule,
};
use zlema_core::domain::pips::{display_pair, format_pips, price_decimals};
use zlema_core::domain::{AccountMode, Direction, OpenTrade, OverlaySettings};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel fills the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Chart,
    Trades,
    Strategy,
    Account,
    News,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Chart,
        Panel::Trades,
        Panel::Strategy,
        Panel::Account,
        Panel::News,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Chart => 0,
            Panel::Trades => 1,
            Panel::Strategy => 2,
            Panel::Account => 3,
            Panel::News => 4,
            Panel::Help => 5,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Chart => "Chart",
            Panel::Trades => "Trades",
            Panel::Strategy => "Strategy",
            Panel::Account => "Account",
            Panel::News => "News",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
}

/// Rows of the strategy panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyField {
    Zlema1,
    ZeroLag,
    ZlLength,
    Polynomial,
    Lookback,
    Forecast,
    Degree,
}

impl StrategyField {
    pub const ALL: [StrategyField; 7] = [
        StrategyField::Zlema1,
        StrategyField::ZeroLag,
        StrategyField::ZlLength,
        StrategyField::Polynomial,
        StrategyField::Lookback,
        StrategyField::Forecast,
        StrategyField::Degree,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StrategyField::Zlema1 => "ZLEMA1",
            StrategyField::ZeroLag => "Zero Lag",
            StrategyField::ZlLength => "ZL Length",
            StrategyField::Polynomial => "Polynomial",
            StrategyField::Lookback => "Lookback",
            StrategyField::Forecast => "Forecast",
            StrategyField::Degree => "Degree",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next row down, stopping at the last.
    pub fn down(self) -> Self {
        Self::ALL[(self.position() + 1).min(Self::ALL.len() - 1)]
    }

    pub fn up(self) -> Self {
        Self::ALL[self.position().saturating_sub(1)]
    }
}

pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,
    pub overlay: Overlay,
    pub dashboard: DashboardState,
    /// Parameters, polynomial settings and strategy toggles being displayed.
    pub request: DashboardRequest,
    pub overlays: OverlaySettings,
    pub news_ai: bool,
    pub selected_trade: usize,
    pub strategy_field: StrategyField,
    /// Mode the next connect command switches to.
    pub connect_mode: AccountMode,
    pub news_scroll: usize,
    pub error_scroll: usize,
    pub status_message: Option<(String, StatusLevel)>,
    /// Commands sent to the worker that have not answered yet.
    pub pending: usize,
    pub schedule: Schedule,
    pub watcher: ParamsWatcher,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        config: &DashboardConfig,
    ) -> Self {
        let defaults = &config.defaults;
        let mut params = defaults.params.clone();
        params.strategy = defaults.toggles.strategy_mode();
        let request = DashboardRequest {
            params,
            polynomial: defaults.polynomial.clamped(),
            toggles: defaults.toggles,
        };
        Self {
            running: true,
            active_panel: Panel::Chart,
            overlay: Overlay::Welcome,
            dashboard: DashboardState::new(),
            watcher: ParamsWatcher::new(request.clone()),
            request,
            overlays: defaults.overlays,
            news_ai: defaults.news_ai_analysis,
            selected_trade: 0,
            strategy_field: StrategyField::Zlema1,
            connect_mode: AccountMode::Practice,
            news_scroll: 0,
            error_scroll: 0,
            status_message: None,
            pending: 0,
            schedule: Schedule::from_config(&config.poll),
            worker_tx,
            worker_rx,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Forward a command to the worker. A dead worker is reported, not fatal.
    pub fn send(&mut self, cmd: WorkerCommand) {
        let answers = cmd.expects_response();
        match self.worker_tx.send(cmd) {
            Ok(()) if answers => self.pending += 1,
            Ok(()) => {}
            Err(err) => {
                warn!(command = ?err.0, "worker channel closed");
                self.set_error("Background worker stopped; restart the dashboard");
            }
        }
    }

    /// React to parameter edits, then start whatever polls are due.
    pub fn tick(&mut self, now: Instant) {
        match self.watcher.update(&self.request) {
            ParamChange::RefetchAndReset => {
                debug!(pair = %self.request.params.pair, timeframe = %self.request.params.timeframe, "market switched");
                self.dashboard.reset_market();
                self.send(WorkerCommand::ResetCache);
                self.schedule.expire(Job::Dashboard);
                self.schedule.expire(Job::News);
            }
            ParamChange::Refetch => self.schedule.expire(Job::Dashboard),
            ParamChange::None => {}
        }

        for job in self.schedule.due(now) {
            self.schedule.mark(job, now);
            let cmd = match job {
                Job::Dashboard => WorkerCommand::Refresh {
                    request: self.request.clone(),
                    scope: RefreshScope::Full,
                },
                Job::MarketStatus => WorkerCommand::MarketStatus,
                Job::News => WorkerCommand::News {
                    pair: self.request.params.pair.clone(),
                    ai: self.news_ai,
                },
            };
            self.send(cmd);
        }
    }

    /// Poll everything on the next tick.
    pub fn refresh_now(&mut self) {
        for job in Job::ALL {
            self.schedule.expire(job);
        }
        self.set_status("Refreshing...");
    }

    pub fn cancel_requests(&mut self) {
        self.send(WorkerCommand::Cancel);
        self.set_warning("Cancelled in-flight requests");
    }

    pub fn toggle_news_ai(&mut self) {
        self.news_ai = !self.news_ai;
        self.schedule.expire(Job::News);
    }

    pub fn open_trades(&self) -> &[OpenTrade] {
        self.dashboard
            .trades
            .as_ref()
            .map_or(&[], |t| t.open_trades.as_slice())
    }

    pub fn selected_trade(&self) -> Option<&OpenTrade> {
        self.open_trades().get(self.selected_trade)
    }

    pub fn select_trade(&mut self, delta: isize) {
        let count = self.open_trades().len();
        if count == 0 {
            self.selected_trade = 0;
            return;
        }
        let next = self.selected_trade as isize + delta;
        self.selected_trade = next.clamp(0, count as isize - 1) as usize;
    }

    pub fn place_trade(&mut self, direction: Direction) {
        let params = &self.request.params;
        let msg = format!(
            "Submitting {direction} {} {}...",
            params.units,
            display_pair(&params.pair)
        );
        info!(%direction, units = params.units, pair = %params.pair, "placing trade");
        self.send(WorkerCommand::PlaceTrade {
            request: self.request.clone(),
            direction,
        });
        self.set_status(msg);
    }

    pub fn close_selected(&mut self) {
        let Some(trade_id) = self.selected_trade().map(|t| t.trade_id.clone()) else {
            self.set_warning("No open trade selected");
            return;
        };
        self.send(WorkerCommand::CloseTrade {
            request: self.request.clone(),
            trade_id: trade_id.clone(),
        });
        self.set_status(format!("Closing trade #{trade_id}..."));
    }

    pub fn close_all(&mut self) {
        if self.dashboard.open_trade_count() == 0 {
            self.set_warning("No open trades to close");
            return;
        }
        self.send(WorkerCommand::CloseAll {
            request: self.request.clone(),
        });
        self.set_status("Closing all trades...");
    }

    pub fn connect(&mut self) {
        let mode = self.connect_mode;
        self.send(WorkerCommand::Connect {
            request: self.request.clone(),
            mode,
        });
        self.set_status(format!("Connecting to {mode} account..."));
    }

    /// Merge one worker response into the dashboard.
    pub fn handle_response(&mut self, resp: WorkerResponse) {
        self.pending = self.pending.saturating_sub(1);
        match resp {
            WorkerResponse::Refreshed(batch) => {
                self.dashboard.apply_current(batch, &self.request.params);
            }
            WorkerResponse::TradePlaced { direction, outcome } => {
                if let Some(fill) = self.dashboard.apply_command("trade", outcome.result) {
                    let decimals = price_decimals(&self.request.params.pair);
                    self.set_status(format!(
                        "{direction} filled at {:.*} (#{}, {})",
                        decimals, fill.price, fill.trade_id, fill.mode
                    ));
                }
                if let Some(batch) = outcome.refresh {
                    self.dashboard.apply_current(batch, &self.request.params);
                }
            }
            WorkerResponse::TradeClosed { trade_id, outcome } => {
                if let Some(closed) = self.dashboard.apply_command("close trade", outcome.result) {
                    self.set_status(format!(
                        "Closed #{trade_id}: {}",
                        format_pips(closed.profit)
                    ));
                }
                if let Some(batch) = outcome.refresh {
                    self.dashboard.apply_current(batch, &self.request.params);
                }
            }
            WorkerResponse::AllClosed(outcome) => {
                if let Some(closed) = self.dashboard.apply_command("close all", outcome.result) {
                    self.set_status(format!(
                        "Closed {} trades: {}",
                        closed.closed_trades,
                        format_pips(closed.total_profit)
                    ));
                }
                if let Some(batch) = outcome.refresh {
                    self.dashboard.apply_current(batch, &self.request.params);
                }
            }
            WorkerResponse::Connected(outcome) => {
                if let Some(conn) = self.dashboard.apply_command("connect", outcome.result) {
                    self.set_status(format!("Connected: {} account", conn.mode));
                }
                if let Some(batch) = outcome.refresh {
                    self.dashboard.apply_current(batch, &self.request.params);
                }
            }
            WorkerResponse::MarketStatus(result) => self.dashboard.apply_market_status(result),
            WorkerResponse::News(result) => self.dashboard.apply_news(result),
        }
        self.select_trade(0);
    }

    pub fn open_error_history(&mut self) {
        self.error_scroll = 0;
        self.overlay = Overlay::ErrorHistory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{open_trade, test_app, trades_batch};
    use std::time::Duration;
    use zlema_core::api::ApiError;
    use zlema_core::dashboard::{CommandOutcome, RefreshBatch};
    use zlema_core::domain::{MarketData, TradeResponse, TradesResponse};

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Chart.next(), Panel::Trades);
        assert_eq!(Panel::Help.next(), Panel::Chart);
        assert_eq!(Panel::Chart.prev(), Panel::Help);
        assert_eq!(Panel::Account.prev(), Panel::Strategy);
    }

    #[test]
    fn panel_from_index() {
        for panel in Panel::ALL {
            assert_eq!(Panel::from_index(panel.index()), Some(panel));
        }
        assert_eq!(Panel::from_index(6), None);
    }

    #[test]
    fn strategy_field_stops_at_ends() {
        assert_eq!(StrategyField::Zlema1.up(), StrategyField::Zlema1);
        assert_eq!(StrategyField::Degree.down(), StrategyField::Degree);
        assert_eq!(StrategyField::ZeroLag.down(), StrategyField::ZlLength);
    }

    #[test]
    fn first_tick_polls_everything() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.tick(Instant::now());
        let cmds: Vec<_> = cmd_rx.try_iter().collect();
        assert_eq!(cmds.len(), 3);
        assert!(matches!(
            cmds[0],
            WorkerCommand::Refresh { scope: RefreshScope::Full, .. }
        ));
        assert!(matches!(cmds[1], WorkerCommand::MarketStatus));
        assert!(matches!(cmds[2], WorkerCommand::News { .. }));
        assert_eq!(app.pending, 3);
    }

    #[test]
    fn pair_change_resets_and_refetches_once() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        let t0 = Instant::now();
        app.tick(t0);
        cmd_rx.try_iter().for_each(drop);

        app.request.params.cycle_pair(true);
        app.tick(t0 + Duration::from_millis(50));
        let cmds: Vec<_> = cmd_rx.try_iter().collect();
        assert!(matches!(cmds[0], WorkerCommand::ResetCache));
        let refreshes: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                WorkerCommand::Refresh { request, .. } => Some(request.params.pair.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(refreshes, vec!["EUR_USD".to_string()]);

        app.tick(t0 + Duration::from_millis(100));
        assert_eq!(cmd_rx.try_iter().count(), 0);
    }

    #[test]
    fn refresh_for_previous_pair_is_not_shown() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        let t0 = Instant::now();
        app.tick(t0);
        let old_params = app.request.params.clone();
        cmd_rx.try_iter().for_each(drop);

        app.request.params.cycle_pair(true);
        app.tick(t0 + Duration::from_millis(50));

        let mut batch = RefreshBatch::new(RefreshScope::Full, old_params);
        batch.market_data = Some(Ok(Some(MarketData {
            pair: "GBP_USD".into(),
            ..Default::default()
        })));
        batch.trades = Some(Ok(Some(TradesResponse::default())));
        app.handle_response(WorkerResponse::Refreshed(batch));

        assert!(app.dashboard.market_data.is_none());
        assert!(app.dashboard.current_price.is_none());
        assert!(app.dashboard.trades.is_some());
    }

    #[test]
    fn units_change_is_quiet() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        let t0 = Instant::now();
        app.tick(t0);
        cmd_rx.try_iter().for_each(drop);

        app.request.params.step_units(true);
        app.tick(t0 + Duration::from_millis(50));
        assert_eq!(cmd_rx.try_iter().count(), 0);
    }

    #[test]
    fn close_selected_without_trades_warns() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.close_selected();
        assert_eq!(cmd_rx.try_iter().count(), 0);
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn trade_fill_merges_refresh() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.pending = 1;
        app.handle_response(WorkerResponse::TradePlaced {
            direction: Direction::Buy,
            outcome: CommandOutcome {
                result: Ok(Some(TradeResponse {
                    status: "ok".into(),
                    trade_id: "9".into(),
                    price: 1.2712,
                    mode: "practice".into(),
                })),
                refresh: Some(trades_batch(vec![open_trade("9")])),
            },
        });
        assert_eq!(app.pending, 0);
        assert_eq!(app.dashboard.open_trade_count(), 1);
        assert_eq!(app.selected_trade().map(|t| t.trade_id.as_str()), Some("9"));
        let (msg, level) = app.status_message.clone().unwrap();
        assert_eq!(level, StatusLevel::Info);
        assert!(msg.contains("#9"));
    }

    #[test]
    fn failed_trade_sets_banner() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.handle_response(WorkerResponse::TradePlaced {
            direction: Direction::Sell,
            outcome: CommandOutcome {
                result: Err(ApiError::Http {
                    status: 400,
                    detail: "Insufficient margin".into(),
                }),
                refresh: None,
            },
        });
        assert_eq!(app.dashboard.error.as_deref(), Some("Insufficient margin"));
        assert_eq!(app.dashboard.error_history[0].context, "trade");
    }

    #[test]
    fn selection_is_clamped_when_trades_shrink() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.dashboard.apply(trades_batch(vec![open_trade("1"), open_trade("2")]));
        app.select_trade(5);
        assert_eq!(app.selected_trade, 1);
        app.handle_response(WorkerResponse::Refreshed(trades_batch(vec![open_trade("1")])));
        assert_eq!(app.selected_trade, 0);
    }
}
