//! Per-endpoint supersession of in-flight requests.
//!
//! Each endpoint key (`METHOD:path`) has at most one live ticket. Beginning a
//! new request for the same key flags the previous ticket as cancelled; its
//! response, whenever it arrives, is discarded by the client. Requests to
//! different endpoints never cancel each other, so a parallel refresh can
//! run all of its calls at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    endpoint: String,
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl RequestTicket {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct InflightRegistry {
    next_generation: AtomicU64,
    live: Mutex<HashMap<String, RequestTicket>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<String, RequestTicket>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new request, superseding any live one for the same endpoint.
    pub fn begin(&self, endpoint: &str) -> RequestTicket {
        let ticket = RequestTicket {
            endpoint: endpoint.to_string(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        if let Some(previous) = self.live().insert(endpoint.to_string(), ticket.clone()) {
            previous.cancel();
            debug!(
                endpoint,
                superseded = previous.generation,
                by = ticket.generation,
                "superseded in-flight request"
            );
        }
        ticket
    }

    /// Release the slot, unless a newer request has taken it over.
    pub fn finish(&self, ticket: &RequestTicket) {
        let mut live = self.live();
        if live
            .get(&ticket.endpoint)
            .is_some_and(|current| current.generation == ticket.generation)
        {
            live.remove(&ticket.endpoint);
        }
    }

    /// Cancel the live request for `endpoint`, or every live request when `None`.
    ///
    /// Returns how many requests were cancelled.
    pub fn cancel(&self, endpoint: Option<&str>) -> usize {
        let mut live = self.live();
        match endpoint {
            Some(key) => match live.remove(key) {
                Some(ticket) => {
                    ticket.cancel();
                    1
                }
                None => 0,
            },
            None => {
                let n = live.len();
                for (_, ticket) in live.drain() {
                    ticket.cancel();
                }
                n
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.live().len()
    }

    pub fn is_in_flight(&self, endpoint: &str) -> bool {
        self.live().contains_key(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_endpoint_supersedes() {
        let reg = InflightRegistry::new();
        let first = reg.begin("GET:/api/market-data");
        let second = reg.begin("GET:/api/market-data");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.generation() > first.generation());
        assert_eq!(reg.in_flight(), 1);
    }

    #[test]
    fn different_endpoints_coexist() {
        let reg = InflightRegistry::new();
        let a = reg.begin("GET:/api/market-data");
        let b = reg.begin("GET:/api/key-levels");
        assert!(!a.is_cancelled());
        assert!(!b.is_cancelled());
        assert_eq!(reg.in_flight(), 2);
    }

    #[test]
    fn stale_finish_keeps_newer_slot() {
        let reg = InflightRegistry::new();
        let first = reg.begin("GET:/api/trades");
        let second = reg.begin("GET:/api/trades");
        reg.finish(&first);
        assert!(reg.is_in_flight("GET:/api/trades"));
        reg.finish(&second);
        assert!(!reg.is_in_flight("GET:/api/trades"));
    }

    #[test]
    fn cancel_one_or_all() {
        let reg = InflightRegistry::new();
        let a = reg.begin("GET:/api/market-data");
        let b = reg.begin("GET:/api/status");
        assert_eq!(reg.cancel(Some("GET:/api/status")), 1);
        assert!(b.is_cancelled());
        assert!(!a.is_cancelled());
        assert_eq!(reg.cancel(Some("GET:/api/status")), 0);

        let c = reg.begin("GET:/api/news");
        assert_eq!(reg.cancel(None), 2);
        assert!(a.is_cancelled());
        assert!(c.is_cancelled());
        assert_eq!(reg.in_flight(), 0);
    }
}
