//! ZLEMA Trader core: backend types, cached API client, chart model and
//! dashboard orchestration.
//!
//! This crate holds everything the front ends share:
//! - Domain types for parameters and backend payloads
//! - Blocking HTTP transport behind a `Transport` trait, with a TTL cache
//!   and per-endpoint supersession of in-flight requests
//! - A pure chart builder that turns market data into ordered traces
//! - Parallel dashboard refreshes and last-write-wins state merging
//! - TOML configuration

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod domain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the worker thread hands to the UI is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Payloads
        require_send::<domain::MarketData>();
        require_sync::<domain::MarketData>();
        require_send::<domain::KeyLevelsResponse>();
        require_sync::<domain::KeyLevelsResponse>();
        require_send::<domain::TradesResponse>();
        require_sync::<domain::TradesResponse>();
        require_send::<domain::AccountStatus>();
        require_sync::<domain::AccountStatus>();
        require_send::<domain::NewsFeed>();
        require_sync::<domain::NewsFeed>();

        // Client
        require_send::<api::ApiClient<api::HttpTransport>>();
        require_sync::<api::ApiClient<api::HttpTransport>>();
        require_send::<api::ApiError>();
        require_sync::<api::ApiError>();

        // Dashboard
        require_send::<dashboard::RefreshBatch>();
        require_send::<dashboard::DashboardService<api::HttpTransport>>();
        require_sync::<dashboard::DashboardService<api::HttpTransport>>();
        require_send::<dashboard::DashboardState>();

        // Chart
        require_send::<chart::ChartSpec>();
        require_sync::<chart::ChartSpec>();
    }

    /// The transport seam accepts trait objects, so front ends can swap in mocks.
    #[test]
    fn transport_is_object_safe() {
        fn _boxed(t: Box<dyn api::Transport>) -> api::ApiClient<Box<dyn api::Transport>> {
            api::ApiClient::new(t)
        }
    }
}
