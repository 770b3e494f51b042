//! End-to-end dashboard flows against the mock transport.

mod common;

use std::sync::Arc;

use common::MockTransport;
use rayon::ThreadPool;
use zlema_core::api::{paths, ApiClient, ApiError};
use zlema_core::dashboard::{
    DashboardRequest, DashboardService, DashboardState, ParamChange, ParamsWatcher, RefreshScope,
};
use zlema_core::domain::Direction;

fn pool() -> ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .thread_name(|i| format!("zlema-test-{i}"))
        .build()
        .unwrap()
}

fn service() -> DashboardService<MockTransport> {
    DashboardService::new(Arc::new(ApiClient::new(MockTransport::healthy())))
}

/// What the front ends do on every parameter edit.
fn on_edit(
    service: &DashboardService<MockTransport>,
    pool: &ThreadPool,
    watcher: &mut ParamsWatcher,
    state: &mut DashboardState,
    request: &DashboardRequest,
) -> ParamChange {
    let change = watcher.update(request);
    if change == ParamChange::RefetchAndReset {
        service.client().clear_cache();
        state.reset_market();
    }
    if change.needs_refetch() {
        state.apply(service.refresh(pool, request, RefreshScope::Full));
    }
    change
}

#[test]
fn pair_change_triggers_exactly_one_market_data_request() {
    let service = service();
    let pool = pool();
    let mut request = DashboardRequest::default();
    let mut watcher = ParamsWatcher::new(request.clone());
    let mut state = DashboardState::new();

    state.apply(service.refresh(&pool, &request, RefreshScope::Full));
    assert!(!state.is_initial_load);
    service.client().transport().reset_log();

    request.params.cycle_pair(true);
    let change = on_edit(&service, &pool, &mut watcher, &mut state, &request);
    assert_eq!(change, ParamChange::RefetchAndReset);

    let sent = service.client().transport().requests_to(paths::MARKET_DATA);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query_value("pair"), Some(request.params.pair.as_str()));
    assert_ne!(request.params.pair, "GBP_USD");

    // Re-applying the same parameters is quiet.
    let again = on_edit(&service, &pool, &mut watcher, &mut state, &request);
    assert_eq!(again, ParamChange::None);
    assert_eq!(service.client().transport().count(paths::MARKET_DATA), 1);
}

#[test]
fn unit_size_edit_does_not_refetch() {
    let service = service();
    let pool = pool();
    let mut request = DashboardRequest::default();
    let mut watcher = ParamsWatcher::new(request.clone());
    let mut state = DashboardState::new();

    request.params.step_units(true);
    assert_eq!(on_edit(&service, &pool, &mut watcher, &mut state, &request), ParamChange::None);
    assert!(service.client().transport().requests().is_empty());
}

#[test]
fn trade_refreshes_trades_and_account_status() {
    let service = service();
    let pool = pool();
    let mut request = DashboardRequest::default();
    request.params.set_units(30_000);
    let mut state = DashboardState::new();

    let outcome = service.place_trade(&pool, &request, Direction::Buy);
    let placed = state.apply_command("trade", outcome.result).expect("trade placed");
    assert_eq!(placed.trade_id, "7");
    let refresh = outcome.refresh.expect("follow-up refresh");
    assert_eq!(refresh.scope, RefreshScope::Trading);
    assert_eq!(state.apply(refresh), 2);

    let t = service.client().transport();
    assert_eq!(t.count(paths::TRADE), 1);
    assert_eq!(t.count(paths::TRADES), 1);
    assert_eq!(t.count(paths::STATUS), 1);
    assert_eq!(t.count(paths::MARKET_DATA), 0);

    let body = t.requests_to(paths::TRADE)[0].body.clone().unwrap();
    assert_eq!(body["size"], 30_000);
    assert_eq!(body["direction"], "BUY");
    assert_eq!(body["pair"], "GBP_USD");
}

#[test]
fn close_all_refreshes_even_with_warm_trade_cache() {
    let service = service();
    let pool = pool();
    let request = DashboardRequest::default();
    let mut state = DashboardState::new();

    state.apply(service.refresh(&pool, &request, RefreshScope::Trading));
    let outcome = service.close_all(&pool, &request);
    let closed = state.apply_command("close all", outcome.result).unwrap();
    assert_eq!(closed.closed_trades, 2);
    assert!(outcome.refresh.is_some());
    assert_eq!(service.client().transport().count(paths::TRADES), 2);
}

#[test]
fn failed_refresh_sets_banner_and_history() {
    let transport = MockTransport::healthy();
    transport.route(
        paths::STATUS,
        Err(ApiError::Http { status: 502, detail: "Broker connection lost".into() }),
    );
    let service = DashboardService::new(Arc::new(ApiClient::new(transport)));
    let pool = pool();
    let mut state = DashboardState::new();

    let updated = state.apply(service.refresh(&pool, &DashboardRequest::default(), RefreshScope::Full));
    assert_eq!(updated, 3);
    assert_eq!(state.error.as_deref(), Some("Broker connection lost"));
    assert_eq!(state.error_history.len(), 1);
    assert_eq!(state.error_history[0].context, "account status");
    assert!(state.market_data.is_some());
    assert!(state.current_price.is_some());
}
