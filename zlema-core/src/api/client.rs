//! Cached, supersession-aware API client.
//!
//! Every call goes through [`ApiClient::call`]:
//! 1. GETs with a TTL policy are answered from the cache when possible.
//! 2. Otherwise a ticket is taken for the endpoint, superseding any older
//!    request to the same endpoint.
//! 3. When the response arrives for a ticket that has since been superseded
//!    or cancelled, it is dropped and the call returns `Ok(None)`.
//! 4. Successful GETs are cached; failures set the last-error string.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::cache::TtlCache;
use super::error::ApiError;
use super::inflight::InflightRegistry;
use super::request::{paths, ApiRequest, Method};
use super::transport::Transport;
use crate::domain::{
    AccountMode, AccountStatus, CloseAllResponse, CloseTradeResponse, ConnectResponse,
    KeyLevelsResponse, MarketData, MarketStatus, NewsFeed, PolynomialParams,
    PolynomialPredictions, TradeRequest, TradeResponse, TradesResponse, TradingParams,
};

/// Whether a GET may be served from, and stored in, the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    NoCache,
    Ttl(Duration),
}

/// Per-endpoint cache lifetimes.
pub mod ttl {
    use std::time::Duration;

    pub const MARKET_DATA: Duration = Duration::from_secs(2);
    pub const KEY_LEVELS: Duration = Duration::from_secs(10);
    pub const POLYNOMIAL_PREDICTIONS: Duration = Duration::from_secs(5);
    pub const TRADES: Duration = Duration::from_secs(1);
    pub const MARKET_STATUS: Duration = Duration::from_secs(60);
    pub const NEWS: Duration = Duration::from_secs(30);
}

pub struct ApiClient<T: Transport> {
    transport: T,
    cache: TtlCache,
    inflight: InflightRegistry,
    last_error: Mutex<Option<String>>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: TtlCache::new(),
            inflight: InflightRegistry::new(),
            last_error: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn last_error_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a request. `Ok(None)` means the request was superseded or
    /// cancelled and its result must be ignored.
    pub fn call(&self, request: &ApiRequest, policy: CachePolicy) -> Result<Option<Value>, ApiError> {
        let cache_slot = match (request.method, policy) {
            (Method::Get, CachePolicy::Ttl(ttl)) => Some((request.cache_key(), ttl)),
            _ => None,
        };

        if let Some((key, _)) = &cache_slot {
            if let Some(hit) = self.cache.get(key) {
                debug!(endpoint = %request.endpoint_key(), "cache hit");
                return Ok(Some(hit));
            }
        }

        let ticket = self.inflight.begin(&request.endpoint_key());
        *self.last_error_slot() = None;

        let outcome = self.transport.send(request);
        self.inflight.finish(&ticket);

        if ticket.is_cancelled() {
            debug!(
                endpoint = ticket.endpoint(),
                generation = ticket.generation(),
                "discarding superseded response"
            );
            return Ok(None);
        }

        match outcome {
            Ok(value) => {
                if let Some((key, ttl)) = cache_slot {
                    self.cache.insert(key, value.clone(), ttl);
                }
                Ok(Some(value))
            }
            Err(err) => {
                warn!(endpoint = ticket.endpoint(), error = %err, "request failed");
                *self.last_error_slot() = Some(err.banner());
                Err(err)
            }
        }
    }

    /// [`call`](Self::call) and decode the body into `R`.
    pub fn fetch<R: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        policy: CachePolicy,
    ) -> Result<Option<R>, ApiError> {
        let Some(value) = self.call(request, policy)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                let err = ApiError::Decode(format!("{}: {e}", request.path));
                warn!(endpoint = %request.endpoint_key(), error = %err, "decode failed");
                *self.last_error_slot() = Some(err.banner());
                Err(err)
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn market_data(&self, params: &TradingParams) -> Result<Option<MarketData>, ApiError> {
        let req = ApiRequest::get(paths::MARKET_DATA).with_query(params.market_data_query());
        self.fetch(&req, CachePolicy::Ttl(ttl::MARKET_DATA))
    }

    pub fn key_levels(&self, params: &TradingParams) -> Result<Option<KeyLevelsResponse>, ApiError> {
        let req = ApiRequest::get(paths::KEY_LEVELS).with_query(params.key_levels_query());
        self.fetch(&req, CachePolicy::Ttl(ttl::KEY_LEVELS))
    }

    pub fn polynomial_predictions(
        &self,
        params: &TradingParams,
        poly: &PolynomialParams,
    ) -> Result<Option<PolynomialPredictions>, ApiError> {
        let req = ApiRequest::get(paths::POLYNOMIAL_PREDICTIONS).with_query(poly.query(params));
        self.fetch(&req, CachePolicy::Ttl(ttl::POLYNOMIAL_PREDICTIONS))
    }

    pub fn trades(&self) -> Result<Option<TradesResponse>, ApiError> {
        self.fetch(&ApiRequest::get(paths::TRADES), CachePolicy::Ttl(ttl::TRADES))
    }

    /// Account status is never cached.
    pub fn account_status(&self) -> Result<Option<AccountStatus>, ApiError> {
        self.fetch(&ApiRequest::get(paths::STATUS), CachePolicy::NoCache)
    }

    pub fn market_status(&self) -> Result<Option<MarketStatus>, ApiError> {
        self.fetch(
            &ApiRequest::get(paths::MARKET_STATUS),
            CachePolicy::Ttl(ttl::MARKET_STATUS),
        )
    }

    pub fn news(&self, pair: &str, enable_ai_analysis: bool) -> Result<Option<NewsFeed>, ApiError> {
        let req = ApiRequest::get(paths::NEWS).with_query(vec![
            ("currency_pair".into(), pair.to_string()),
            ("enable_ai_analysis".into(), enable_ai_analysis.to_string()),
        ]);
        self.fetch(&req, CachePolicy::Ttl(ttl::NEWS))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn place_trade(&self, trade: &TradeRequest) -> Result<Option<TradeResponse>, ApiError> {
        let body = serde_json::to_value(trade)?;
        let resp: Option<TradeResponse> =
            self.fetch(&ApiRequest::post(paths::TRADE).with_body(body), CachePolicy::NoCache)?;
        if let Some(r) = &resp {
            info!(
                pair = %trade.pair,
                direction = %trade.direction,
                size = trade.size,
                trade_id = %r.trade_id,
                price = r.price,
                "trade placed"
            );
        }
        Ok(resp)
    }

    pub fn close_trade(&self, trade_id: &str) -> Result<Option<CloseTradeResponse>, ApiError> {
        if trade_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("trade id is empty".into()));
        }
        // The id becomes a path segment; anything outside the URL-unreserved set could reroute it.
        if !trade_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(ApiError::InvalidRequest(format!(
                "trade id '{trade_id}' contains characters not allowed in a path segment"
            )));
        }
        let resp: Option<CloseTradeResponse> = self.fetch(
            &ApiRequest::post(paths::close_trade(trade_id)),
            CachePolicy::NoCache,
        )?;
        if let Some(r) = &resp {
            info!(trade_id, profit = r.profit, "trade closed");
        }
        Ok(resp)
    }

    pub fn close_all_trades(&self) -> Result<Option<CloseAllResponse>, ApiError> {
        let resp: Option<CloseAllResponse> =
            self.fetch(&ApiRequest::post(paths::CLOSE_ALL), CachePolicy::NoCache)?;
        if let Some(r) = &resp {
            info!(closed = r.closed_trades, total_profit = r.total_profit, "closed all trades");
        }
        Ok(resp)
    }

    pub fn connect(&self, mode: AccountMode) -> Result<Option<ConnectResponse>, ApiError> {
        if mode == AccountMode::Unknown {
            return Err(ApiError::InvalidRequest("cannot connect to an unknown account mode".into()));
        }
        let req = ApiRequest::post(paths::CONNECT)
            .with_query(vec![("mode".into(), mode.as_str().into())]);
        let resp: Option<ConnectResponse> = self.fetch(&req, CachePolicy::NoCache)?;
        if resp.is_some() {
            info!(%mode, "connected account");
        }
        Ok(resp)
    }

    // ── State ────────────────────────────────────────────────────────

    /// True while at least one non-superseded request is in flight.
    pub fn loading(&self) -> bool {
        self.inflight.in_flight() > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error_slot().clone()
    }

    pub fn clear_error(&self) {
        *self.last_error_slot() = None;
    }

    pub fn clear_cache(&self) {
        debug!(entries = self.cache.len(), "clearing response cache");
        self.cache.clear();
    }

    /// Drop the cached response for one request, if any.
    pub fn invalidate(&self, request: &ApiRequest) -> bool {
        self.cache.remove(&request.cache_key())
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Cancel the live request for one endpoint key (`METHOD:path`), or all of them.
    pub fn cancel(&self, endpoint: Option<&str>) -> usize {
        self.inflight.cancel(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
        reply: Result<Value, ApiError>,
    }

    impl CountingTransport {
        fn ok(reply: Value) -> Self {
            Self { calls: AtomicUsize::new(0), reply: Ok(reply) }
        }

        fn failing(err: ApiError) -> Self {
            Self { calls: AtomicUsize::new(0), reply: Err(err) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for CountingTransport {
        fn name(&self) -> &str {
            "counting"
        }

        fn send(&self, _request: &ApiRequest) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn get_with_ttl_is_served_from_cache() {
        let client = ApiClient::new(CountingTransport::ok(json!({ "open_trades": [] })));
        client.trades().unwrap();
        client.trades().unwrap();
        assert_eq!(client.transport().calls(), 1);
    }

    #[test]
    fn no_cache_policy_always_sends() {
        let client = ApiClient::new(CountingTransport::ok(json!({ "account_mode": "test" })));
        client.account_status().unwrap();
        client.account_status().unwrap();
        assert_eq!(client.transport().calls(), 2);
        assert_eq!(client.cached_entries(), 0);
    }

    #[test]
    fn close_trade_rejects_ids_that_would_change_the_route() {
        let client = ApiClient::new(CountingTransport::ok(json!({ "status": "closed", "profit": 1.0 })));
        for id in ["12/close-all", "12?x=1", "12#frag", "a b", "%2F"] {
            assert!(matches!(
                client.close_trade(id),
                Err(ApiError::InvalidRequest(_))
            ));
        }
        assert_eq!(client.transport().calls(), 0);

        client.close_trade("1234-ab_c.9").unwrap();
        assert_eq!(client.transport().calls(), 1);
    }

    #[test]
    fn posts_are_never_cached() {
        let client = ApiClient::new(CountingTransport::ok(json!({ "status": "closed", "closed_trades": 0 })));
        client.close_all_trades().unwrap();
        client.close_all_trades().unwrap();
        assert_eq!(client.transport().calls(), 2);
    }

    #[test]
    fn failure_sets_last_error_and_success_clears_it() {
        let client = ApiClient::new(CountingTransport::failing(ApiError::Http {
            status: 500,
            detail: "OANDA unreachable".into(),
        }));
        let err = client.account_status().unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(client.last_error().as_deref(), Some("OANDA unreachable"));
        assert!(!client.loading());

        client.clear_error();
        assert!(client.last_error().is_none());
    }

    #[test]
    fn decode_failure_is_reported() {
        let client = ApiClient::new(CountingTransport::ok(json!({ "open_trades": "nope" })));
        let err = client.trades().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(client.last_error().is_some());
    }

    #[test]
    fn clear_cache_forces_refetch() {
        let client = ApiClient::new(CountingTransport::ok(json!({})));
        client.market_status().unwrap();
        client.clear_cache();
        client.market_status().unwrap();
        assert_eq!(client.transport().calls(), 2);
    }

    #[test]
    fn invalidate_drops_one_entry() {
        let client = ApiClient::new(CountingTransport::ok(json!({})));
        client.trades().unwrap();
        client.market_status().unwrap();
        assert!(client.invalidate(&ApiRequest::get(paths::TRADES)));
        client.trades().unwrap();
        client.market_status().unwrap();
        assert_eq!(client.transport().calls(), 3);
    }

    #[test]
    fn empty_trade_id_is_rejected_locally() {
        let client = ApiClient::new(CountingTransport::ok(json!({})));
        assert!(matches!(client.close_trade(" "), Err(ApiError::InvalidRequest(_))));
        assert_eq!(client.transport().calls(), 0);
    }
}
