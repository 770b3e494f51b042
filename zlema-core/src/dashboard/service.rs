//! Parallel dashboard refreshes and the trade commands that trigger them.
//!
//! A refresh fans its requests out on the caller's rayon pool and waits for
//! all of them. Each slot of the resulting [`RefreshBatch`] records whether
//! that request was issued, failed, was superseded, or returned data.

use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use tracing::debug;

use crate::api::{paths, ApiClient, ApiError, ApiRequest, Transport};
use crate::domain::{
    AccountMode, AccountStatus, CloseAllResponse, CloseTradeResponse, ConnectResponse, Direction,
    KeyLevelsResponse, MarketData, PolynomialParams, PolynomialPredictions, StrategyToggles,
    TradeRequest, TradeResponse, TradesResponse, TradingParams,
};

/// `None`: not requested. `Some(Ok(None))`: superseded, ignore.
pub type Slot<T> = Option<Result<Option<T>, ApiError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Market data, key levels, trades, account status, and predictions
    /// when the polynomial toggle is on.
    Full,
    /// Trades and account status only.
    Trading,
}

/// What the dashboard is currently showing, as far as requests are concerned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardRequest {
    pub params: TradingParams,
    pub polynomial: PolynomialParams,
    pub toggles: StrategyToggles,
}

#[derive(Debug)]
pub struct RefreshBatch {
    pub scope: RefreshScope,
    /// Parameters the batch was fetched with.
    pub params: TradingParams,
    pub market_data: Slot<MarketData>,
    pub key_levels: Slot<KeyLevelsResponse>,
    pub predictions: Slot<PolynomialPredictions>,
    pub trades: Slot<TradesResponse>,
    pub status: Slot<AccountStatus>,
}

impl RefreshBatch {
    pub fn new(scope: RefreshScope, params: TradingParams) -> Self {
        Self {
            scope,
            params,
            market_data: None,
            key_levels: None,
            predictions: None,
            trades: None,
            status: None,
        }
    }

    /// Errors in the batch, in slot order.
    pub fn errors(&self) -> Vec<&ApiError> {
        fn err<T>(slot: &Slot<T>) -> Option<&ApiError> {
            slot.as_ref().and_then(|r| r.as_ref().err())
        }
        [
            err(&self.market_data),
            err(&self.key_levels),
            err(&self.predictions),
            err(&self.trades),
            err(&self.status),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Number of requests this batch issued.
    pub fn requested(&self) -> usize {
        [
            self.market_data.is_some(),
            self.key_levels.is_some(),
            self.predictions.is_some(),
            self.trades.is_some(),
            self.status.is_some(),
        ]
        .into_iter()
        .filter(|b| *b)
        .count()
    }
}

/// Result of a trade command plus the refresh it triggered on success.
#[derive(Debug)]
pub struct CommandOutcome<R> {
    pub result: Result<Option<R>, ApiError>,
    pub refresh: Option<RefreshBatch>,
}

pub struct DashboardService<T: Transport> {
    client: Arc<ApiClient<T>>,
}

impl<T: Transport> Clone for DashboardService<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<T: Transport> DashboardService<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn refresh(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
        scope: RefreshScope,
    ) -> RefreshBatch {
        let started = Instant::now();
        let client = &*self.client;
        let params = &request.params;
        let mut batch = RefreshBatch::new(scope, params.clone());
        {
            let RefreshBatch {
                market_data,
                key_levels,
                predictions,
                trades,
                status,
                ..
            } = &mut batch;
            pool.scope(|s| {
                if scope == RefreshScope::Full {
                    s.spawn(move |_| *market_data = Some(client.market_data(params)));
                    s.spawn(move |_| *key_levels = Some(client.key_levels(params)));
                    if request.toggles.polynomial {
                        s.spawn(move |_| {
                            *predictions =
                                Some(client.polynomial_predictions(params, &request.polynomial))
                        });
                    }
                }
                s.spawn(move |_| *trades = Some(client.trades()));
                s.spawn(move |_| *status = Some(client.account_status()));
            });
        }
        debug!(
            ?scope,
            pair = %params.pair,
            requests = batch.requested(),
            errors = batch.errors().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh finished"
        );
        batch
    }

    /// Invalidate the cached trade list, then refresh trades and status.
    fn after_command(&self, pool: &ThreadPool, request: &DashboardRequest) -> RefreshBatch {
        self.client.invalidate(&ApiRequest::get(paths::TRADES));
        self.refresh(pool, request, RefreshScope::Trading)
    }

    fn command<R>(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
        result: Result<Option<R>, ApiError>,
    ) -> CommandOutcome<R> {
        let refresh = matches!(result, Ok(Some(_))).then(|| self.after_command(pool, request));
        CommandOutcome { result, refresh }
    }

    /// Market order for the current pair and unit size.
    pub fn place_trade(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
        direction: Direction,
    ) -> CommandOutcome<TradeResponse> {
        let trade = TradeRequest {
            pair: request.params.pair.clone(),
            size: request.params.units,
            direction,
        };
        let result = self.client.place_trade(&trade);
        self.command(pool, request, result)
    }

    pub fn close_trade(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
        trade_id: &str,
    ) -> CommandOutcome<CloseTradeResponse> {
        let result = self.client.close_trade(trade_id);
        self.command(pool, request, result)
    }

    pub fn close_all(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
    ) -> CommandOutcome<CloseAllResponse> {
        let result = self.client.close_all_trades();
        self.command(pool, request, result)
    }

    pub fn connect(
        &self,
        pool: &ThreadPool,
        request: &DashboardRequest,
        mode: AccountMode,
    ) -> CommandOutcome<ConnectResponse> {
        let result = self.client.connect(mode);
        self.command(pool, request, result)
    }
}
