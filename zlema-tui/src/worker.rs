//! Background worker thread: every backend call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each
//! request-issuing command runs as its own task on a private rayon pool, so
//! a slow refresh never blocks the next one; the client's in-flight registry
//! discards whichever result was superseded.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use rayon::ThreadPool;
use tracing::{debug, info};

use zlema_core::api::{ApiError, Transport};
use zlema_core::dashboard::{CommandOutcome, DashboardRequest, DashboardService, RefreshBatch, RefreshScope};
use zlema_core::domain::{
    AccountMode, CloseAllResponse, CloseTradeResponse, ConnectResponse, Direction, MarketStatus,
    NewsFeed, TradeResponse,
};

const POOL_THREADS: usize = 4;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Refresh {
        request: DashboardRequest,
        scope: RefreshScope,
    },
    PlaceTrade {
        request: DashboardRequest,
        direction: Direction,
    },
    CloseTrade {
        request: DashboardRequest,
        trade_id: String,
    },
    CloseAll {
        request: DashboardRequest,
    },
    Connect {
        request: DashboardRequest,
        mode: AccountMode,
    },
    MarketStatus,
    News {
        pair: String,
        ai: bool,
    },
    /// Drop every cached response.
    ResetCache,
    /// Supersede everything in flight.
    Cancel,
    Shutdown,
}

impl WorkerCommand {
    /// Whether the worker answers this command with a [`WorkerResponse`].
    pub fn expects_response(&self) -> bool {
        !matches!(
            self,
            WorkerCommand::ResetCache | WorkerCommand::Cancel | WorkerCommand::Shutdown
        )
    }
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Refreshed(RefreshBatch),
    TradePlaced {
        direction: Direction,
        outcome: CommandOutcome<TradeResponse>,
    },
    TradeClosed {
        trade_id: String,
        outcome: CommandOutcome<CloseTradeResponse>,
    },
    AllClosed(CommandOutcome<CloseAllResponse>),
    Connected(CommandOutcome<ConnectResponse>),
    MarketStatus(Result<Option<MarketStatus>, ApiError>),
    News(Result<Option<NewsFeed>, ApiError>),
}

/// Spawn the background worker thread.
pub fn spawn_worker<T: Transport + 'static>(
    service: DashboardService<T>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> Result<JoinHandle<()>> {
    // Private pool, not the global one.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .thread_name(|i| format!("zlema-pool-{i}"))
        .build()
        .context("build worker rayon pool")?;
    let pool = Arc::new(pool);

    thread::Builder::new()
        .name("zlema-worker".into())
        .spawn(move || worker_loop(service, pool, rx, tx))
        .context("spawn worker thread")
}

fn worker_loop<T: Transport + 'static>(
    service: DashboardService<T>,
    pool: Arc<ThreadPool>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(cmd, &service, &pool, &tx),
        }
    }
    let cancelled = service.client().cancel(None);
    debug!(cancelled, "worker stopped");
}

fn handle_command<T: Transport + 'static>(
    cmd: WorkerCommand,
    service: &DashboardService<T>,
    pool: &Arc<ThreadPool>,
    tx: &Sender<WorkerResponse>,
) {
    match cmd {
        WorkerCommand::ResetCache => service.client().clear_cache(),
        WorkerCommand::Cancel => {
            let cancelled = service.client().cancel(None);
            info!(cancelled, "cancelled in-flight requests");
        }
        WorkerCommand::Shutdown => {} // handled in loop
        cmd => {
            let service = service.clone();
            let task_pool = Arc::clone(pool);
            let tx = tx.clone();
            pool.spawn(move || {
                let resp = run(cmd, &service, &task_pool);
                // The UI may already be gone during shutdown.
                if let Some(resp) = resp {
                    let _ = tx.send(resp);
                }
            });
        }
    }
}

fn run<T: Transport>(
    cmd: WorkerCommand,
    service: &DashboardService<T>,
    pool: &ThreadPool,
) -> Option<WorkerResponse> {
    let client = service.client();
    let resp = match cmd {
        WorkerCommand::Refresh { request, scope } => {
            WorkerResponse::Refreshed(service.refresh(pool, &request, scope))
        }
        WorkerCommand::PlaceTrade { request, direction } => WorkerResponse::TradePlaced {
            direction,
            outcome: service.place_trade(pool, &request, direction),
        },
        WorkerCommand::CloseTrade { request, trade_id } => WorkerResponse::TradeClosed {
            outcome: service.close_trade(pool, &request, &trade_id),
            trade_id,
        },
        WorkerCommand::CloseAll { request } => {
            WorkerResponse::AllClosed(service.close_all(pool, &request))
        }
        WorkerCommand::Connect { request, mode } => {
            WorkerResponse::Connected(service.connect(pool, &request, mode))
        }
        WorkerCommand::MarketStatus => WorkerResponse::MarketStatus(client.market_status()),
        WorkerCommand::News { pair, ai } => WorkerResponse::News(client.news(&pair, ai)),
        WorkerCommand::ResetCache | WorkerCommand::Cancel | WorkerCommand::Shutdown => return None,
    };
    Some(resp)
}
