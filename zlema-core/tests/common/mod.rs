//! Shared fixtures: a scriptable in-memory transport and canned payloads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde_json::{json, Value};
use zlema_core::api::{paths, ApiError, ApiRequest, Transport};

struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Answers by path, records every request, and can park a request until released.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Result<Value, ApiError>>>,
    log: Mutex<Vec<ApiRequest>>,
    gates: Mutex<HashMap<String, Vec<Gate>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport preloaded with a healthy response for every dashboard route.
    pub fn healthy() -> Self {
        let t = Self::new();
        t.route(paths::MARKET_DATA, Ok(market_data_json("GBP_USD", 24)));
        t.route(paths::KEY_LEVELS, Ok(key_levels_json()));
        t.route(paths::POLYNOMIAL_PREDICTIONS, Ok(json!({ "predictions": [1.0, 2.0, 3.0] })));
        t.route(paths::TRADES, Ok(json!({ "open_trades": [], "profit_history": [] })));
        t.route(paths::STATUS, Ok(json!({ "account_mode": "test", "total_profit": 0.0 })));
        t.route(paths::TRADE, Ok(json!({ "status": "success", "trade_id": "7", "price": 1.2701 })));
        t.route(paths::CLOSE_ALL, Ok(json!({ "status": "success", "closed_trades": 2, "total_profit": 12.5 })));
        t
    }

    pub fn route(&self, path: &str, reply: Result<Value, ApiError>) {
        self.routes.lock().unwrap().insert(path.to_string(), reply);
    }

    /// Park the next request to `path`. Returns (entered, release): `entered`
    /// fires once the request reaches the transport; sending on `release`
    /// lets it answer.
    pub fn hold_next(&self, path: &str) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(Gate { entered: entered_tx, release: release_rx });
        (entered_rx, release_tx)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    pub fn reset_log(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.log.lock().unwrap().push(request.clone());

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(|q| (!q.is_empty()).then(|| q.remove(0)));
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }

        self.routes
            .lock()
            .unwrap()
            .get(&request.path)
            .cloned()
            .unwrap_or(Ok(json!({})))
    }
}

/// Market-data body with `bars` bars: raw candles plus two smoothed sets.
pub fn market_data_json(pair: &str, bars: usize) -> Value {
    let series = |offset: f64| -> Vec<f64> {
        (0..bars).map(|i| offset + (i as f64 * 0.3).sin() * 5.0).collect()
    };
    let candle_set = |shift: f64| {
        let open = series(shift);
        let close = series(shift + 0.5);
        let high: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.max(*c) + 1.0).collect();
        let low: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.min(*c) - 1.0).collect();
        json!([open, close, high, low])
    };
    let mut eff: Vec<Value> = (0..2)
        .map(|k| json!((0..bars).map(|i| ((i + k) as f64 * 0.2).sin()).collect::<Vec<_>>()))
        .collect();
    // Warm-up bar arrives as null.
    eff[0][0] = Value::Null;
    json!({
        "all_candles": [candle_set(0.0), candle_set(0.2), candle_set(-0.2)],
        "eff_data": eff,
        "std_devs": series(2.0).iter().map(|v| v.abs()).collect::<Vec<_>>(),
        "medians": series(0.1),
        "rsi_data": [(0..bars).map(|i| 50.0 + (i as f64 * 0.4).sin() * 20.0).collect::<Vec<_>>()],
        "pair": pair,
        "timeframe": "M5",
        "periods": bars,
        "timestamp": "2026-01-05T10:00:00Z"
    })
}

pub fn key_levels_json() -> Value {
    json!({
        "key_levels": {
            "levels": [
                { "price": -3.0, "type": "support", "confidence": 0.8 },
                { "price": 4.0, "type": "resistance", "confidence": 0.7 },
                { "price": 0.5, "type": "fibonacci", "confidence": 0.4 },
                { "price": 1.5, "type": "volume", "confidence": 0.6 }
            ]
        },
        "pair": "GBP_USD",
        "timeframe": "M5",
        "periods": 24,
        "window": 20,
        "threshold": 0.001
    })
}
