//! Dashboard data as last received from the backend.
//!
//! Results are merged last-write-wins. Superseded results (`Ok(None)`) leave
//! the state untouched; errors set the banner and land in a bounded history.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use tracing::debug;

use super::service::{RefreshBatch, Slot};
use crate::api::ApiError;
use crate::domain::{
    AccountStatus, KeyLevelsResponse, MarketData, MarketStatus, NewsFeed, PolynomialPredictions,
    TradesResponse, TradingParams,
};

pub const ERROR_HISTORY_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    /// `NET`, `API`, `DATA` or `REQ`.
    pub category: &'static str,
    pub message: String,
    /// Which request failed.
    pub context: String,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub market_data: Option<MarketData>,
    pub key_levels: Option<KeyLevelsResponse>,
    pub predictions: Option<PolynomialPredictions>,
    pub trades: Option<TradesResponse>,
    pub status: Option<AccountStatus>,
    /// Market status plus when it arrived, for the local countdown.
    pub market_status: Option<(MarketStatus, Instant)>,
    pub news: Option<NewsFeed>,
    /// Dismissible banner text.
    pub error: Option<String>,
    pub error_history: VecDeque<ErrorRecord>,
    pub last_update: Option<NaiveDateTime>,
    pub current_price: Option<f64>,
    pub is_initial_load: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            market_data: None,
            key_levels: None,
            predictions: None,
            trades: None,
            status: None,
            market_status: None,
            news: None,
            error: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            last_update: None,
            current_price: None,
            is_initial_load: true,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a refresh batch. Returns how many slots carried new data.
    pub fn apply(&mut self, batch: RefreshBatch) -> usize {
        let mut updated = 0;
        if let Some(data) = self.take("market data", batch.market_data) {
            self.current_price = data.current_price().or(self.current_price);
            self.market_data = Some(data);
            updated += 1;
        }
        if let Some(levels) = self.take("key levels", batch.key_levels) {
            self.key_levels = Some(levels);
            updated += 1;
        }
        if let Some(predictions) = self.take("polynomial predictions", batch.predictions) {
            self.predictions = Some(predictions);
            updated += 1;
        }
        if let Some(trades) = self.take("trades", batch.trades) {
            self.trades = Some(trades);
            updated += 1;
        }
        if let Some(status) = self.take("account status", batch.status) {
            self.status = Some(status);
            updated += 1;
        }
        if updated > 0 {
            self.mark_updated();
        }
        updated
    }

    /// Merge a batch fetched for `current`, or for parameters the view has
    /// since moved away from. Chart slots of a stale batch are dropped so an
    /// old pair's candles never land under the new title; account slots do
    /// not depend on the parameters and are kept.
    pub fn apply_current(&mut self, mut batch: RefreshBatch, current: &TradingParams) -> usize {
        if batch.params.affects_requests(current) {
            debug!(
                fetched_pair = %batch.params.pair,
                fetched_timeframe = %batch.params.timeframe,
                "dropping chart data fetched for stale parameters"
            );
            batch.market_data = None;
            batch.key_levels = None;
            batch.predictions = None;
        }
        self.apply(batch)
    }

    pub fn apply_market_status(&mut self, result: Result<Option<MarketStatus>, ApiError>) {
        if let Some(status) = self.take("market status", Some(result)) {
            self.market_status = Some((status, Instant::now()));
            self.mark_updated();
        }
    }

    pub fn apply_news(&mut self, result: Result<Option<NewsFeed>, ApiError>) {
        if let Some(news) = self.take("news", Some(result)) {
            self.news = Some(news);
            self.mark_updated();
        }
    }

    /// Record the outcome of a trade command; returns the response on success.
    pub fn apply_command<R>(&mut self, context: &str, result: Result<Option<R>, ApiError>) -> Option<R> {
        self.take(context, Some(result))
    }

    fn take<T>(&mut self, context: &str, slot: Slot<T>) -> Option<T> {
        match slot? {
            Ok(value) => value,
            Err(err) => {
                self.push_error(&err, context);
                None
            }
        }
    }

    fn mark_updated(&mut self) {
        self.last_update = Some(chrono::Local::now().naive_local());
        self.is_initial_load = false;
    }

    /// Set the banner and push to the history, capping at 50.
    pub fn push_error(&mut self, err: &ApiError, context: &str) {
        let message = err.banner();
        self.error_history.push_front(ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category: err.category(),
            message: message.clone(),
            context: context.to_string(),
        });
        self.error_history.truncate(ERROR_HISTORY_CAP);
        self.error = Some(message);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Drop everything fetched for the previous pair or timeframe.
    pub fn reset_market(&mut self) {
        self.market_data = None;
        self.key_levels = None;
        self.predictions = None;
        self.current_price = None;
    }

    /// Seconds until the next session change, counted down locally.
    pub fn market_countdown(&self) -> Option<String> {
        self.market_status
            .as_ref()
            .map(|(status, at)| status.countdown(at.elapsed()))
    }

    /// Time since the market status arrived.
    pub fn market_status_age(&self) -> Option<Duration> {
        self.market_status.as_ref().map(|(_, at)| at.elapsed())
    }

    pub fn open_trade_count(&self) -> usize {
        self.trades.as_ref().map_or(0, |t| t.open_trades.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::service::RefreshScope;
    use crate::domain::{CandleSet, TradingParams};

    fn market(close: f64) -> MarketData {
        MarketData {
            all_candles: vec![CandleSet {
                open: vec![1.0, 2.0],
                close: vec![2.0, close],
                high: vec![2.5, close + 1.0],
                low: vec![0.5, 1.0],
                volume: None,
            }],
            ..Default::default()
        }
    }

    fn batch() -> RefreshBatch {
        RefreshBatch::new(RefreshScope::Full, TradingParams::default())
    }

    #[test]
    fn stale_batch_keeps_account_but_drops_chart_slots() {
        let mut state = DashboardState::new();
        let mut current = TradingParams::default();
        current.cycle_pair(true);

        let mut b = batch();
        b.market_data = Some(Ok(Some(market(3.5))));
        b.trades = Some(Ok(Some(TradesResponse::default())));
        assert_eq!(state.apply_current(b, &current), 1);
        assert!(state.market_data.is_none());
        assert!(state.current_price.is_none());
        assert!(state.trades.is_some());
    }

    #[test]
    fn units_change_does_not_make_a_batch_stale() {
        let mut state = DashboardState::new();
        let mut current = TradingParams::default();
        current.step_units(true);

        let mut b = batch();
        b.market_data = Some(Ok(Some(market(3.5))));
        assert_eq!(state.apply_current(b, &current), 1);
        assert_eq!(state.current_price, Some(3.5));
    }

    #[test]
    fn starts_in_initial_load() {
        let state = DashboardState::new();
        assert!(state.is_initial_load);
        assert!(state.last_update.is_none());
    }

    #[test]
    fn data_clears_initial_load_and_sets_price() {
        let mut state = DashboardState::new();
        let mut b = batch();
        b.market_data = Some(Ok(Some(market(3.5))));
        b.trades = Some(Ok(Some(TradesResponse::default())));
        assert_eq!(state.apply(b), 2);
        assert!(!state.is_initial_load);
        assert!(state.last_update.is_some());
        assert_eq!(state.current_price, Some(3.5));
    }

    #[test]
    fn superseded_results_leave_state_untouched() {
        let mut state = DashboardState::new();
        let mut first = batch();
        first.market_data = Some(Ok(Some(market(3.5))));
        state.apply(first);

        let mut stale = batch();
        stale.market_data = Some(Ok(None));
        assert_eq!(state.apply(stale), 0);
        assert_eq!(state.current_price, Some(3.5));
        assert!(state.error.is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut state = DashboardState::new();
        for close in [3.0, 4.0] {
            let mut b = batch();
            b.market_data = Some(Ok(Some(market(close))));
            state.apply(b);
        }
        assert_eq!(state.current_price, Some(4.0));
    }

    #[test]
    fn errors_set_banner_and_keep_old_data() {
        let mut state = DashboardState::new();
        let mut ok = batch();
        ok.market_data = Some(Ok(Some(market(3.5))));
        state.apply(ok);

        let mut failed = batch();
        failed.market_data = Some(Err(ApiError::Http {
            status: 503,
            detail: "OANDA unavailable".into(),
        }));
        assert_eq!(state.apply(failed), 0);
        assert_eq!(state.error.as_deref(), Some("OANDA unavailable"));
        assert!(state.market_data.is_some());
        let record = &state.error_history[0];
        assert_eq!(record.category, "API");
        assert_eq!(record.context, "market data");

        state.dismiss_error();
        assert!(state.error.is_none());
        assert_eq!(state.error_history.len(), 1);
    }

    #[test]
    fn error_history_caps_at_50() {
        let mut state = DashboardState::new();
        for i in 0..60 {
            state.push_error(&ApiError::Network(format!("error {i}")), "test");
        }
        assert_eq!(state.error_history.len(), ERROR_HISTORY_CAP);
        assert!(state.error_history[0].message.contains("59"));
    }

    #[test]
    fn market_status_counts_down() {
        let mut state = DashboardState::new();
        state.apply_market_status(Ok(Some(MarketStatus {
            seconds_to_next: 3_725,
            ..Default::default()
        })));
        let countdown = state.market_countdown().unwrap();
        assert!(countdown == "01:02:05" || countdown == "01:02:04");
    }

    #[test]
    fn reset_market_keeps_account_data() {
        let mut state = DashboardState::new();
        let mut b = batch();
        b.market_data = Some(Ok(Some(market(3.5))));
        b.status = Some(Ok(Some(AccountStatus::default())));
        state.apply(b);
        state.reset_market();
        assert!(state.market_data.is_none());
        assert!(state.current_price.is_none());
        assert!(state.status.is_some());
    }
}
