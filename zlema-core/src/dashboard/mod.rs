//! Dashboard orchestration: parallel refreshes, state merging, parameter
//! change detection and poll timers.

pub mod schedule;
pub mod service;
pub mod state;
pub mod watcher;

pub use schedule::{Job, Schedule};
pub use service::{CommandOutcome, DashboardRequest, DashboardService, RefreshBatch, RefreshScope, Slot};
pub use state::{DashboardState, ErrorRecord, ERROR_HISTORY_CAP};
pub use watcher::{ParamChange, ParamsWatcher};
