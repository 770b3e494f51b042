//! Transport trait and the blocking HTTP implementation.
//!
//! The Transport trait abstracts over how a request reaches the backend so the
//! cached client can be driven by a scripted transport in tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::trace;

use super::error::{ApiError, GENERIC_ERROR};
use super::request::{ApiRequest, Method};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one request and returns the decoded JSON body.
///
/// Implementations do not cache and do not track supersession; the client
/// layer above handles both.
pub trait Transport: Send + Sync {
    /// Human-readable name of this transport.
    fn name(&self) -> &str;

    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        (**self).send(request)
    }
}

/// Blocking reqwest transport against a base URL.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.url(&request.path);
        trace!(method = %request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        } else if request.method == Method::Post {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        }

        let resp = builder.send().map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(e.to_string())
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                detail: error_detail(status.canonical_reason(), &body),
            });
        }

        parse_body(&body)
    }
}

/// Decode a success body; an empty body is `null`.
pub(crate) fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| ApiError::Decode(format!("response is not JSON: {e}")))
}

/// Extract the banner text from an error response.
///
/// Precedence: the backend's `detail` field, then the raw body, then the
/// status reason phrase.
pub(crate) fn error_detail(reason: Option<&str>, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    reason.unwrap_or(GENERIC_ERROR).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_wins() {
        let d = error_detail(Some("Bad Request"), r#"{"detail":"Pair not supported"}"#);
        assert_eq!(d, "Pair not supported");
    }

    #[test]
    fn structured_detail_is_serialized() {
        let d = error_detail(
            Some("Unprocessable Entity"),
            r#"{"detail":[{"loc":["query","periods"],"msg":"value is not a valid integer"}]}"#,
        );
        assert!(d.contains("value is not a valid integer"));
    }

    #[test]
    fn falls_back_to_body_then_reason() {
        assert_eq!(error_detail(Some("Bad Gateway"), "upstream down"), "upstream down");
        assert_eq!(error_detail(Some("Bad Gateway"), "<html>502</html>"), "Bad Gateway");
        assert_eq!(error_detail(None, ""), GENERIC_ERROR);
    }

    #[test]
    fn empty_success_body_is_null() {
        assert_eq!(parse_body("  ").unwrap(), Value::Null);
        assert!(matches!(parse_body("not json"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let t = HttpTransport::new("http://localhost:8000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(t.base_url(), "http://localhost:8000");
        assert_eq!(t.url("/api/status"), "http://localhost:8000/api/status");
    }
}
