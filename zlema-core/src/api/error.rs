//! Structured error type for backend calls.

use thiserror::Error;

/// Fallback banner text when neither the backend nor the transport gave a reason.
pub const GENERIC_ERROR: &str = "An error occurred";

/// Errors from a single backend request.
///
/// Displayable in both CLI and TUI contexts. Superseded requests are not
/// errors and never produce one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("response format changed: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Short human-readable text for the dismissible banner.
    ///
    /// Backend `detail` strings are shown verbatim; transport failures keep
    /// their category prefix.
    pub fn banner(&self) -> String {
        match self {
            ApiError::Http { detail, .. } if !detail.is_empty() => detail.clone(),
            ApiError::Http { status, .. } => format!("HTTP {status}"),
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    GENERIC_ERROR.to_string()
                } else {
                    text
                }
            }
        }
    }

    /// Short category tag for the error history.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => "NET",
            ApiError::Http { .. } => "API",
            ApiError::Decode(_) => "DATA",
            ApiError::InvalidRequest(_) => "REQ",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
