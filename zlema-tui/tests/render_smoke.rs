//! Draw every panel into an off-screen buffer, with and without backend data.

use std::sync::mpsc;

use proptest::prelude::*;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use zlema_core::config::DashboardConfig;
use zlema_core::domain::{
    AccountStatus, CandleSet, Direction, MarketData, NewsAnalysis, NewsFeed, NewsItem, OpenTrade,
    TradesResponse,
};
use zlema_tui::app::{AppState, Overlay, Panel};
use zlema_tui::ui;
use zlema_tui::ui::widgets::slider;

fn app() -> AppState {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let mut app = AppState::new(cmd_tx, resp_rx, &DashboardConfig::default());
    app.overlay = Overlay::None;
    app
}

fn candles(n: usize) -> CandleSet {
    let open: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin() * 10.0).collect();
    let close: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7 + 0.4).sin() * 10.0).collect();
    let high = open.iter().zip(&close).map(|(o, c)| o.max(*c) + 1.5).collect();
    let low = open.iter().zip(&close).map(|(o, c)| o.min(*c) - 1.5).collect();
    CandleSet {
        open,
        close,
        high,
        low,
        volume: Some(vec![100.0; n]),
    }
}

fn loaded_app() -> AppState {
    let mut app = app();
    let n = 40;
    app.dashboard.market_data = Some(MarketData {
        all_candles: vec![candles(n), candles(n)],
        eff_data: vec![(0..n).map(|i| (i as f64 * 0.3).cos()).collect()],
        std_devs: vec![0.5; n],
        medians: vec![0.0; n],
        rsi_data: vec![(0..n).map(|i| 50.0 + (i as f64 * 0.5).sin() * 20.0).collect()],
        zl: None,
        pair: "EUR_USD".into(),
        timeframe: "H1".into(),
        periods: n as u32,
        timestamp: "2024-01-01T00:00:00".into(),
    });
    app.dashboard.trades = Some(TradesResponse {
        open_trades: vec![OpenTrade {
            trade_id: "42".into(),
            pair: "EUR_USD".into(),
            direction: Direction::Sell,
            size: 5_000.0,
            entry_price: 1.08512,
            current_pl: -3.2,
            practice_mode: Some(false),
        }],
        profit_history: vec![4.0, -2.0],
    });
    app.dashboard.status = Some(AccountStatus {
        account_balance: Some(10_250.0),
        open_trades_count: 1,
        total_profit: 12.5,
        profit_history: vec![5.0, -1.5, 9.0],
        total_trades: 3,
        ..Default::default()
    });
    app.dashboard.news = Some(NewsFeed {
        news_items: vec![NewsItem {
            title: "ECB holds rates".into(),
            description: "Policy unchanged for a third meeting.".into(),
            source: "Wire".into(),
            published: "2024-01-01".into(),
            analysis: Some(NewsAnalysis {
                impact: "BEARISH".into(),
                reasoning: "Dovish guidance".into(),
                confidence: "MEDIUM".into(),
            }),
            ..Default::default()
        }],
        currency_pair: "EUR_USD".into(),
        ..Default::default()
    });
    app
}

fn render(app: &AppState) -> String {
    let backend = TestBackend::new(160, 48);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn every_panel_draws_while_waiting() {
    let mut app = app();
    for panel in Panel::ALL {
        app.active_panel = panel;
        let screen = render(&app);
        assert!(screen.contains("ZLEMA Trader"), "{panel:?}");
        assert!(screen.contains(panel.label()), "{panel:?}");
    }
}

#[test]
fn every_panel_draws_with_data() {
    let mut app = loaded_app();
    for panel in Panel::ALL {
        app.active_panel = panel;
        let screen = render(&app);
        assert!(screen.contains("ZLEMA Trader"), "{panel:?}");
    }
}

#[test]
fn trades_and_news_show_payload() {
    let mut app = loaded_app();
    app.active_panel = Panel::Trades;
    assert!(render(&app).contains("#42"));

    app.active_panel = Panel::News;
    let screen = render(&app);
    assert!(screen.contains("ECB holds rates"));
    assert!(screen.contains("BEARISH"));
}

#[test]
fn banner_and_welcome_overlay_draw() {
    let mut app = app();
    app.dashboard.error = Some("Network error: connection refused".into());
    assert!(render(&app).contains("connection refused"));

    app.overlay = Overlay::Welcome;
    assert!(render(&app).contains("Welcome to ZLEMA Trader"));
}

#[test]
fn tiny_terminal_does_not_panic() {
    let app = loaded_app();
    let backend = TestBackend::new(20, 6);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui::draw(f, &app)).unwrap();
}

proptest! {
    #[test]
    fn slider_width_is_stable(value in -1e6f64..1e6, min in -100.0f64..100.0, span in 0.0f64..100.0, width in 0usize..40) {
        let bar = slider(value, min, min + span, width);
        prop_assert_eq!(bar.chars().count(), width + 2);
    }
}
