//! Keyboard input dispatch: overlays first, then global keys, then the active panel.
//!
//! Order controls (pair, timeframe, periods, units, BUY/SELL) are global so
//! the sidebar works from every panel.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use zlema_core::domain::{Direction, LevelKind};

use crate::app::{AppState, Overlay, Panel, StrategyField};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    if handle_global_key(app, key) {
        return;
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Chart => handle_chart_key(app, key),
        Panel::Trades => handle_trades_key(app, key),
        Panel::Strategy => handle_strategy_key(app, key),
        Panel::Account => handle_account_key(app, key),
        Panel::News => handle_news_key(app, key),
        Panel::Help => {}
    }
}

/// Returns true when the key was consumed.
fn handle_global_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.running = false;
            return true;
        }
        return false;
    }

    let params = &mut app.request.params;
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char(c @ '1'..='6') => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
        }
        KeyCode::Char('?') => app.active_panel = Panel::Help,
        KeyCode::Tab => app.active_panel = app.active_panel.next(),
        KeyCode::BackTab => app.active_panel = app.active_panel.prev(),

        // Order sidebar
        KeyCode::Char('p') => params.cycle_pair(true),
        KeyCode::Char('P') => params.cycle_pair(false),
        KeyCode::Char('t') => params.cycle_timeframe(true),
        KeyCode::Char('T') => params.cycle_timeframe(false),
        KeyCode::Char(']') => params.cycle_periods(true),
        KeyCode::Char('[') => params.cycle_periods(false),
        KeyCode::Char('+') | KeyCode::Char('=') => params.step_units(true),
        KeyCode::Char('-') => params.step_units(false),
        KeyCode::Char('B') => app.place_trade(Direction::Buy),
        KeyCode::Char('S') => app.place_trade(Direction::Sell),
        KeyCode::Char('C') => app.close_all(),

        KeyCode::Char('R') => app.refresh_now(),
        KeyCode::Char('x') => app.dashboard.dismiss_error(),
        KeyCode::Char('e') => app.open_error_history(),
        KeyCode::Esc => app.cancel_requests(),
        _ => return false,
    }
    true
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.dashboard.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    let kind = match key.code {
        KeyCode::Char('s') => LevelKind::Support,
        KeyCode::Char('r') => LevelKind::Resistance,
        KeyCode::Char('v') => LevelKind::Volume,
        KeyCode::Char('f') => LevelKind::Fibonacci,
        KeyCode::Char('o') => LevelKind::Pivots,
        KeyCode::Char('z') => {
            let toggles = &mut app.request.toggles;
            toggles.toggle_zero_lag(&mut app.request.params);
            return;
        }
        KeyCode::Char('y') => {
            app.request.toggles.polynomial = !app.request.toggles.polynomial;
            return;
        }
        _ => return,
    };
    app.overlays.toggle(kind);
}

fn handle_trades_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_trade(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_trade(-1),
        KeyCode::Char('c') | KeyCode::Enter => app.close_selected(),
        _ => {}
    }
}

fn handle_strategy_key(app: &mut AppState, key: KeyEvent) {
    let delta = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.strategy_field = app.strategy_field.down();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.strategy_field = app.strategy_field.up();
            return;
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => 1,
        KeyCode::Char('h') | KeyCode::Left => -1,
        _ => return,
    };

    let request = &mut app.request;
    match app.strategy_field {
        StrategyField::Zlema1 => request.toggles.zlema1 = !request.toggles.zlema1,
        StrategyField::ZeroLag => request.toggles.toggle_zero_lag(&mut request.params),
        StrategyField::ZlLength => request.params.cycle_zl_length(delta > 0),
        StrategyField::Polynomial => request.toggles.polynomial = !request.toggles.polynomial,
        StrategyField::Lookback => request.polynomial.adjust_lookback(delta),
        StrategyField::Forecast => request.polynomial.adjust_forecast(delta),
        StrategyField::Degree => request.polynomial.adjust_degree(delta),
    }
}

fn handle_account_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('m') => app.connect_mode = app.connect_mode.next(),
        KeyCode::Enter => app.connect(),
        _ => {}
    }
}

fn handle_news_key(app: &mut AppState, key: KeyEvent) {
    let count = app
        .dashboard
        .news
        .as_ref()
        .map_or(0, |n| n.news_items.len());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.news_scroll + 1 < count {
                app.news_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => app.news_scroll = app.news_scroll.saturating_sub(1),
        KeyCode::Char('a') => app.toggle_news_ai(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_app, trades_batch, open_trade};
    use crate::worker::WorkerCommand;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ready_app() -> (AppState, std::sync::mpsc::Receiver<WorkerCommand>, std::sync::mpsc::Sender<crate::worker::WorkerResponse>) {
        let (mut app, rx, tx) = test_app();
        app.overlay = Overlay::None;
        (app, rx, tx)
    }

    #[test]
    fn welcome_dismissed_by_any_key() {
        let (mut app, _rx, _tx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('B')));
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.pending, 0);
    }

    #[test]
    fn release_events_ignored() {
        let (mut app, _rx, _tx) = ready_app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn number_keys_switch_panels() {
        let (mut app, _rx, _tx) = ready_app();
        handle_key(&mut app, press(KeyCode::Char('4')));
        assert_eq!(app.active_panel, Panel::Account);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::News);
    }

    #[test]
    fn sidebar_keys_edit_params() {
        let (mut app, _rx, _tx) = ready_app();
        handle_key(&mut app, press(KeyCode::Char('p')));
        assert_eq!(app.request.params.pair, "EUR_USD");
        handle_key(&mut app, press(KeyCode::Char(']')));
        assert_eq!(app.request.params.periods, 96);
        for _ in 0..20 {
            handle_key(&mut app, press(KeyCode::Char('+')));
        }
        assert_eq!(app.request.params.units, 100_000);
    }

    #[test]
    fn buy_sends_trade_with_current_units() {
        let (mut app, rx, _tx) = ready_app();
        handle_key(&mut app, press(KeyCode::Char('+')));
        handle_key(&mut app, press(KeyCode::Char('B')));
        match rx.try_recv().unwrap() {
            WorkerCommand::PlaceTrade { request, direction } => {
                assert_eq!(direction, Direction::Buy);
                assert_eq!(request.params.units, 20_000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn chart_keys_toggle_overlays() {
        let (mut app, _rx, _tx) = ready_app();
        let before = app.overlays.shows(LevelKind::Fibonacci);
        handle_key(&mut app, press(KeyCode::Char('f')));
        assert_ne!(app.overlays.shows(LevelKind::Fibonacci), before);

        handle_key(&mut app, press(KeyCode::Char('z')));
        assert!(app.request.toggles.zero_lag);
        assert_eq!(app.request.params.strategy.as_str(), "zero_lag");
    }

    #[test]
    fn trades_panel_closes_selected() {
        let (mut app, rx, _tx) = ready_app();
        app.dashboard.apply(trades_batch(vec![open_trade("11"), open_trade("12")]));
        app.active_panel = Panel::Trades;
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        match rx.try_recv().unwrap() {
            WorkerCommand::CloseTrade { trade_id, .. } => assert_eq!(trade_id, "12"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn strategy_sliders_clamp() {
        let (mut app, _rx, _tx) = ready_app();
        app.active_panel = Panel::Strategy;
        for _ in 0..6 {
            handle_key(&mut app, press(KeyCode::Char('j')));
        }
        assert_eq!(app.strategy_field, StrategyField::Degree);
        for _ in 0..10 {
            handle_key(&mut app, press(KeyCode::Char('l')));
        }
        assert_eq!(app.request.polynomial.degree, 5);
    }

    #[test]
    fn x_dismisses_banner() {
        let (mut app, _rx, _tx) = ready_app();
        app.dashboard.error = Some("OANDA unavailable".into());
        handle_key(&mut app, press(KeyCode::Char('x')));
        assert!(app.dashboard.error.is_none());
    }
}
