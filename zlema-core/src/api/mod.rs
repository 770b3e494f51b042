//! Backend access: transport, response cache, in-flight supersession and the typed client.

pub mod cache;
pub mod client;
pub mod error;
pub mod inflight;
pub mod request;
pub mod transport;

pub use cache::TtlCache;
pub use client::{ttl, ApiClient, CachePolicy};
pub use error::ApiError;
pub use inflight::{InflightRegistry, RequestTicket};
pub use request::{paths, ApiRequest, Method};
pub use transport::{HttpTransport, Transport, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
