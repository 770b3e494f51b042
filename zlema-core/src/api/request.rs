//! Request descriptors and the keys derived from them.

use std::fmt;

use serde_json::Value;

/// Backend routes.
pub mod paths {
    pub const MARKET_DATA: &str = "/api/market-data";
    pub const KEY_LEVELS: &str = "/api/key-levels";
    pub const POLYNOMIAL_PREDICTIONS: &str = "/api/polynomial-predictions";
    pub const TRADES: &str = "/api/trades";
    pub const STATUS: &str = "/api/status";
    pub const MARKET_STATUS: &str = "/api/market-status";
    pub const NEWS: &str = "/api/news";
    pub const TRADE: &str = "/api/trade";
    pub const CLOSE_ALL: &str = "/api/trades/close-all";
    pub const CONNECT: &str = "/api/connect";

    pub fn close_trade(trade_id: &str) -> String {
        format!("/api/trade/{trade_id}/close")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend call: method, path, query pairs and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Supersession scope: `METHOD:path`. A new request with the same key
    /// cancels the one still in flight.
    pub fn endpoint_key(&self) -> String {
        format!("{}:{}", self.method, self.path)
    }

    /// Full request signature: `METHOD:path:query:body`.
    pub fn signature(&self) -> String {
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let body = self
            .body
            .as_ref()
            .map_or_else(|| "null".to_string(), Value::to_string);
        format!("{}:{}:{{{query}}}:{body}", self.method, self.path)
    }

    /// Cache key: blake3 digest of [`signature`](Self::signature).
    pub fn cache_key(&self) -> String {
        blake3::hash(self.signature().as_bytes()).to_hex().to_string()
    }
}
